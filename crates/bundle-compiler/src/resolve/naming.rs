//! Names of generated temporaries.
//!
//! Depth is the only source of uniqueness: a composite at depth `d` names
//! its locals with suffix `d` (none at depth 0), and its children live at
//! `d + 1`. Siblings at the same depth are kept apart by scoping blocks.

fn suffix(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        depth.to_string()
    }
}

pub fn temp_var(depth: usize) -> String {
    format!("temp{}", suffix(depth))
}

pub fn size_var(depth: usize) -> String {
    format!("size{}", suffix(depth))
}

/// One index variable per dimension: `i` for rank 1, then `i, j, k, ...`.
pub fn index_vars(depth: usize, rank: usize) -> Vec<String> {
    (0..rank)
        .map(|axis| {
            let letter = match u8::try_from(axis).ok().and_then(|a| b'i'.checked_add(a)) {
                Some(c) if c <= b'z' => (c as char).to_string(),
                _ => format!("x{}_", axis),
            };
            format!("{}{}", letter, suffix(depth))
        })
        .collect()
}

/// Count variable for one dimension of a multi-dimensional array.
pub fn dimension_size_var(index: &str) -> String {
    format!("size_{}", index)
}

pub fn key_var(depth: usize) -> String {
    format!("key_{}", temp_var(depth))
}

pub fn value_var(depth: usize) -> String {
    format!("value_{}", temp_var(depth))
}

pub fn tuple_element_var(position: usize, depth: usize) -> String {
    format!("item{}_{}", position, temp_var(depth))
}

/// Local holding a member while an all-fields constructor call is assembled.
pub fn constructor_local(member: &str) -> String {
    format!("{}_value", member.trim_start_matches("r#"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero_has_no_suffix() {
        assert_eq!(temp_var(0), "temp");
        assert_eq!(size_var(0), "size");
        assert_eq!(index_vars(0, 1), vec!["i"]);
        assert_eq!(key_var(0), "key_temp");
        assert_eq!(value_var(0), "value_temp");
        assert_eq!(tuple_element_var(1, 0), "item1_temp");
    }

    #[test]
    fn test_nested_names_carry_depth() {
        assert_eq!(temp_var(2), "temp2");
        assert_eq!(size_var(3), "size3");
        assert_eq!(index_vars(1, 3), vec!["i1", "j1", "k1"]);
        assert_eq!(key_var(1), "key_temp1");
        assert_eq!(tuple_element_var(0, 4), "item0_temp4");
        assert_eq!(dimension_size_var("j1"), "size_j1");
    }

    #[test]
    fn test_constructor_locals() {
        assert_eq!(constructor_local("items"), "items_value");
        assert_eq!(constructor_local("r#type"), "type_value");
    }
}
