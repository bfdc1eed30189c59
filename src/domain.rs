//! Target domain helpers

/// Validate a target hostname and return its IDNA ASCII form without the
/// trailing dot. `None` when the name is empty or not a valid hostname.
pub fn validate_domain(domain: &str) -> Option<String> {
    let domain = domain.trim();
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() {
        return None;
    }
    let ascii = idna::domain_to_ascii_strict(domain).ok()?;
    if ascii.is_empty() || ascii.len() > 253 {
        return None;
    }
    Some(ascii)
}

/// Registrable domain (eTLD+1) of `domain` using a fixed list of common
/// multi-level public suffixes. `None` for single-label names.
pub fn registrable_domain(domain: &str) -> Option<String> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let parts: Vec<&str> = domain.split('.').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return None;
    }

    if parts.len() >= 3 {
        let potential_suffix = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
        if MULTI_LEVEL_SUFFIXES.contains(&potential_suffix.to_ascii_lowercase().as_str()) {
            return Some(parts[parts.len() - 3..].join("."));
        }
    } else if MULTI_LEVEL_SUFFIXES.contains(&domain.to_ascii_lowercase().as_str()) {
        // The name is itself a public suffix
        return None;
    }

    Some(parts[parts.len() - 2..].join("."))
}

/// Fixed fallback list of common multi-level suffixes. This is not a Public
/// Suffix List lookup: names under unlisted multi-level suffixes reduce to
/// their last two labels.
const MULTI_LEVEL_SUFFIXES: [&str; 31] = [
    "co.uk", "co.jp", "co.kr", "co.za", "co.nz", "co.in", "co.il", "com.au", "com.br", "com.cn",
    "com.mx", "com.tw", "com.ar", "com.tr", "net.au", "net.br", "net.cn", "net.il", "org.uk",
    "org.au", "org.br", "org.cn", "org.il", "ac.uk", "gov.uk", "gov.au", "gov.cn", "gov.il",
    "edu.au", "edu.cn", "edu.mx",
];
