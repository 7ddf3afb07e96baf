/// Lowercases and drops separators so `new_name`, `newName` and `NEW-NAME`
/// compare equal.
fn fold(value: &str) -> Vec<char> {
    value
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Optimal string alignment distance: Levenshtein plus adjacent swaps, so
/// `nmae` is one edit away from `name`.
fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];
    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for (j, cell) in d.iter_mut().enumerate().take(width) {
        *cell = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1)
                .min(d[(i - 1) * width + j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1);
            }
            d[i * width + j] = best;
        }
    }
    d[a.len() * width + b.len()]
}

fn threshold(len: usize) -> usize {
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => 3,
    }
}

/// Closest candidates to `input`, best first, capped at `limit`.
pub fn suggest<S: AsRef<str>>(input: &str, candidates: &[S], limit: usize) -> Vec<String> {
    let folded = fold(input);
    if folded.is_empty() {
        return Vec::new();
    }
    let allowed = threshold(folded.len());
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|c| c.as_ref())
        .filter_map(|candidate| {
            let target = fold(candidate);
            let contains = !target.is_empty()
                && (target.windows(folded.len()).any(|w| w == folded.as_slice())
                    || folded.windows(target.len()).any(|w| w == target.as_slice()));
            let score = if target == folded {
                0
            } else if contains {
                1
            } else {
                edit_distance(&folded, &target)
            };
            (score <= allowed).then_some((score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    let mut out: Vec<String> = Vec::new();
    for (_, candidate) in scored {
        if !out.iter().any(|seen| seen == candidate) {
            out.push(candidate.to_string());
        }
        if out.len() >= limit.max(1) {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::suggest;

    #[test]
    fn suggests_tool_names_across_casing() {
        let tools = [
            "createReservation",
            "getReservation",
            "updateReservation",
            "deleteReservation",
        ];
        assert_eq!(suggest("create_reservation", &tools, 3)[0], "createReservation");
        assert_eq!(suggest("getReservaton", &tools, 3)[0], "getReservation");
    }

    #[test]
    fn suggests_close_field_names() {
        let fields = ["mobile", "name", "nb_people", "email", "notes"];
        assert_eq!(suggest("nbpeople", &fields, 3), vec!["nb_people"]);
        assert_eq!(suggest("emial", &fields, 3), vec!["email"]);
        assert!(suggest("zzzzzzzz", &fields, 3).is_empty());
    }
}
