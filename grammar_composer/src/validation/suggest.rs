//! "Did you mean?" name suggestions for unresolved references

use crate::config::compile_time::validation::MAX_SUGGESTION_DISTANCE;

/// Levenshtein distance over chars
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.chars().enumerate() {
            let cost = usize::from(a_char != b_char);

            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Distance allowed for a name of this length, never above the global cap
fn threshold(name_len: usize) -> usize {
    let by_length = match name_len {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        _ => 3,
    };
    by_length.min(MAX_SUGGESTION_DISTANCE)
}

/// Candidates within the threshold, closest first. Equal distances keep
/// candidate order so output is deterministic; duplicates and exact matches
/// are dropped.
pub fn nearest_names<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    if name.is_empty() || limit == 0 {
        return Vec::new();
    }

    let max_distance = threshold(name.chars().count());
    let mut scored: Vec<(usize, &str)> = Vec::new();

    for candidate in candidates {
        if candidate == name || scored.iter().any(|(_, seen)| *seen == candidate) {
            continue;
        }
        if name.len().abs_diff(candidate.len()) > max_distance {
            continue;
        }

        let distance = edit_distance(name, candidate);
        if distance <= max_distance {
            scored.push((distance, candidate));
        }
    }

    // stable sort keeps first-seen order among equal distances
    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("header", "header"), 0);
        assert_eq!(edit_distance("header", "heder"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn test_nearest_names_orders_by_distance() {
        let names = ["sidebar", "main", "mian", "mains", "footer", "main"];
        assert_eq!(nearest_names("man", names, 5), vec!["main", "mian", "mains"]);
        assert_eq!(nearest_names("man", names, 1), vec!["main"]);
        assert!(nearest_names("navigation", names, 3).is_empty());
        assert!(nearest_names("main", ["main"], 3).is_empty());
    }
}
