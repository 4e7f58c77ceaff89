/// Text normalization applied to training text and to every raw context
/// before lookup.
///
/// Training and prediction must use the same normalizer, otherwise the
/// contexts looked up at prediction time will not match the stored keys.
pub trait Normalizer {
	/// Returns the normalized form of `text`.
	fn normalize(&self, text: &str) -> String;
}

/// Default normalizer.
///
/// - Converts all characters to lowercase
/// - Collapses every run of whitespace (spaces, tabs, newlines) into a
///   single space, leading and trailing runs included
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BasicNormalizer;

impl Normalizer for BasicNormalizer {
	fn normalize(&self, text: &str) -> String {
		let mut normalized = String::with_capacity(text.len());
		let mut in_whitespace = false;
		for c in text.chars() {
			if c.is_whitespace() {
				if !in_whitespace {
					normalized.push(' ');
				}
				in_whitespace = true;
			} else {
				normalized.extend(c.to_lowercase());
				in_whitespace = false;
			}
		}
		normalized
	}
}

/// Leaves text untouched. For input that was normalized upstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
	fn normalize(&self, text: &str) -> String {
		text.to_owned()
	}
}

impl<F> Normalizer for F
where
	F: Fn(&str) -> String,
{
	fn normalize(&self, text: &str) -> String {
		self(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_basic_lowercases() {
		assert_eq!(BasicNormalizer.normalize("Hello World"), "hello world");
		assert_eq!(BasicNormalizer.normalize("ÉTÉ"), "été");
	}

	#[test]
	fn test_basic_collapses_whitespace() {
		assert_eq!(BasicNormalizer.normalize("a \t\n b"), "a b");
		assert_eq!(BasicNormalizer.normalize("  lead"), " lead");
		// Trailing space is a meaningful context character
		assert_eq!(BasicNormalizer.normalize("word   "), "word ");
	}

	#[test]
	fn test_identity() {
		assert_eq!(IdentityNormalizer.normalize("Keep  AS is "), "Keep  AS is ");
	}

	#[test]
	fn test_closure_normalizer() {
		let upper = |s: &str| s.to_uppercase();
		assert_eq!(upper.normalize("abc"), "ABC");
	}
}
