//! Small utility helpers used across modules.

/// Canonical form used for email uniqueness: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

/// True for strings that are empty or whitespace only.
pub fn is_blank(s: &str) -> bool {
  s.trim().is_empty()
}

/// Log-safe truncation for user-supplied strings.
/// Cuts on a char boundary so multi-byte input never panics.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let cut = (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
