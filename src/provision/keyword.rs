/// Campaign key derived from a domain: every character outside `[A-Za-z0-9]` is dropped.
///
/// ```
/// use campaign_provisioner::provision::derive_keyword;
///
/// assert_eq!(derive_keyword("my-site.com!"), "mysitecom");
/// ```
pub fn derive_keyword(domain: &str) -> String {
    domain.chars().filter(char::is_ascii_alphanumeric).collect()
}
