/// Characters with structural meaning in a VW line.
const RESERVED: [char; 2] = ['|', ':'];

/// Strip `|` and `:` from a field so it can be embedded as feature tokens.
pub fn clean_field(value: &str) -> String {
    value.chars().filter(|c| !RESERVED.contains(c)).collect()
}
