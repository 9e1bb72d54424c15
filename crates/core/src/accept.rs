//! Acceptability predicates for oracle output and indicator strings.
//!
//! Both are deliberately plain substring denylists: their simplicity is the
//! contract, and every caller shares the same fixed marker sets.

/// Marker substrings that identify a placeholder or error response from the
/// generation oracle. A response containing any of these is unusable.
const ORACLE_ERROR_MARKERS: &[&str] = &[
    "No suitable response", // general error sentinel
    "Shellcode bytes here",
    "/* bytes of the shellcode */",
    "$someString",
    "$string1",
    "$data",
    "CHANGE_ME",
    "{ ? ? ? ? }",
    "{ DD DD DD DD }",
    "$hashValue",
    "hash_here",
    "$ip",
    "ip_address_here",
    "domain.com",
    "url_here",
    "/regex_pattern/",
    "$regex",
    "$filePath",
    "filepath_here",
    "$filename",
    "filename.exe",
    "your_IMPHASH",
    "$imphash",
    "CVE-XXXX-XXXX",
    "CVE-????-????",
    "$condition",
    "condition_here",
];

/// Known-placeholder trash strings that must never seed or join a cluster.
const TRASH_STRINGS: &[&str] = &[
    "interesting string",
    "INSERT INTERESTING STRING",
    "shellcode bytes",
];

/// True if the oracle response contains a recognizable placeholder or error
/// marker and must be discarded by the caller.
pub fn is_unacceptable_oracle_response(text: &str) -> bool {
    ORACLE_ERROR_MARKERS.iter().any(|m| text.contains(m))
}

/// True if an extracted indicator string is known placeholder trash.
pub fn is_trash_string(s: &str) -> bool {
    TRASH_STRINGS.iter().any(|m| s.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_placeholder_rules() {
        assert!(is_unacceptable_oracle_response(
            "rule r { strings: $someString = \"x\" condition: any of them }"
        ));
        assert!(is_unacceptable_oracle_response("meta: cve_id = \"CVE-XXXX-XXXX\""));
        assert!(is_unacceptable_oracle_response("No suitable response received"));
    }

    #[test]
    fn accepts_concrete_rules() {
        assert!(!is_unacceptable_oracle_response(
            "rule r { strings: $payload = \"cmd.exe /c whoami\" condition: any of them }"
        ));
    }

    #[test]
    fn flags_trash_strings() {
        assert!(is_trash_string("\"INSERT INTERESTING STRING\""));
        assert!(is_trash_string("some interesting string here"));
        assert!(!is_trash_string("\"GetProcAddress\""));
    }
}
