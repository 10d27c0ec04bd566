use heck::{ToLowerCamelCase, ToSnakeCase};

/// Convert an operation identifier to `snake_case` (Python client methods).
pub fn to_snake_case(id: &str) -> String {
    id.to_snake_case()
}

/// Passes after which camel casing is expected to have settled.
const MAX_CAMEL_PASSES: usize = 4;

/// Convert an operation identifier to `camelCase` (TypeScript client methods).
///
/// heck joins single-letter words into capital runs (`get_x_y` → `getXY`)
/// that a second pass splits differently (`getXy`), so the conversion is
/// repeated until the output is stable.
pub fn to_camel_case(id: &str) -> String {
    let mut current = id.to_lower_camel_case();
    for _ in 0..MAX_CAMEL_PASSES {
        let next = current.to_lower_camel_case();
        if next == current {
            break;
        }
        current = next;
    }
    current
}
