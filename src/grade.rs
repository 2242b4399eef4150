/// PRNs are stored uppercase; accept whatever casing/padding the caller sends.
pub fn normalize_prn(prn: &str) -> String {
    prn.trim().to_uppercase()
}

/// Column key -> display label: `data_structures` becomes `Data Structures`.
pub fn format_subject_name(raw: &str) -> String {
    raw.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn score_to_grade(score: Option<i64>) -> &'static str {
    let Some(score) = score else {
        return "-";
    };
    if score >= 90 {
        "A+"
    } else if score >= 85 {
        "A"
    } else if score >= 80 {
        "B+"
    } else if score >= 75 {
        "B"
    } else if score >= 70 {
        "C+"
    } else if score >= 60 {
        "C"
    } else {
        "D"
    }
}
