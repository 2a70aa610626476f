use std::io::{self, Read};

use thiserror::Error;
use tracing::debug;
use ttyaskpass::AskPass;

use crate::digest::{self, DigestError};
use crate::settings::CfgInput;

const PROMPT_BUFFER_SIZE: usize = 10240;

/// Where a payload comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Argument(String),
    Stdin,
    Prompt,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read standard input: {message}")]
    ReadStdin { message: io::Error },
    #[error("could not read input: {message}")]
    Prompt { message: String },
    #[error("{0}")]
    Digest(#[from] DigestError),
    #[error("input is empty!")]
    Empty,
}

impl InputSource {
    pub fn from_argument(maybe_input: Option<String>) -> Self {
        match maybe_input {
            None => Self::Prompt,
            Some(input) if input == "-" => Self::Stdin,
            Some(input) => Self::Argument(input),
        }
    }

    fn read_bytes(self) -> Result<Vec<u8>, InputError> {
        match self {
            Self::Argument(input) => Ok(input.into_bytes()),
            Self::Stdin => {
                let mut buffer = Vec::new();
                io::stdin()
                    .lock()
                    .read_to_end(&mut buffer)
                    .map_err(|reason| InputError::ReadStdin { message: reason })?;
                Ok(buffer)
            }
            Self::Prompt => AskPass::new([0; PROMPT_BUFFER_SIZE])
                .with_star('*')
                .askpass("Enter input text: ")
                .map(|x| -> Vec<u8> { x.into() })
                .map_err(|reason| InputError::Prompt {
                    message: reason.to_string(),
                }),
        }
    }
}

pub fn read_payload(source: InputSource, config: &CfgInput) -> Result<String, InputError> {
    debug!(msg = "reading input", source = ?source_name(&source));
    decode_payload(source.read_bytes()?, config)
}

/// Decodes raw input bytes and applies the input policy to the text.
pub fn decode_payload(bytes: Vec<u8>, config: &CfgInput) -> Result<String, InputError> {
    apply_policy(digest::decode(bytes)?, config)
}

/// Applies trimming and empty-input rejection to an already decoded payload.
pub fn apply_policy(text: String, config: &CfgInput) -> Result<String, InputError> {
    let text = if config.trim {
        text.trim().to_string()
    } else {
        text
    };
    if text.is_empty() && !config.allow_empty {
        return Err(InputError::Empty);
    };
    Ok(text)
}

/// Hashes the payload read from `source`.
pub fn digest_source(source: InputSource, config: &CfgInput) -> Result<(String, usize), InputError> {
    let payload = read_payload(source, config)?;
    Ok((digest::to_sha512(&payload), payload.len()))
}

// Argument values are never logged.
fn source_name(source: &InputSource) -> &'static str {
    match source {
        InputSource::Argument(_) => "argument",
        InputSource::Stdin => "stdin",
        InputSource::Prompt => "prompt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(trim: bool, allow_empty: bool) -> CfgInput {
        CfgInput { trim, allow_empty }
    }

    #[test]
    fn source_from_argument() {
        assert_eq!(InputSource::from_argument(None), InputSource::Prompt);
        assert_eq!(
            InputSource::from_argument(Some("-".to_string())),
            InputSource::Stdin
        );
        assert_eq!(
            InputSource::from_argument(Some("abc".to_string())),
            InputSource::Argument("abc".to_string())
        );
    }

    #[test]
    fn argument_is_hashed_as_is() {
        let (hex_digest, input_bytes) = digest_source(
            InputSource::Argument(" abc\n".to_string()),
            &CfgInput::default(),
        )
        .unwrap();
        assert_eq!(hex_digest, digest::to_sha512(" abc\n"));
        assert_eq!(input_bytes, 5);
    }

    #[test]
    fn trim() {
        assert_eq!(
            apply_policy("  abc\n".to_string(), &policy(true, true)).unwrap(),
            "abc"
        );
        assert_eq!(
            apply_policy("  abc\n".to_string(), &policy(false, true)).unwrap(),
            "  abc\n"
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(apply_policy(String::new(), &policy(false, true)).unwrap(), "");
        assert!(matches!(
            apply_policy(String::new(), &policy(false, false)),
            Err(InputError::Empty)
        ));
        assert!(matches!(
            apply_policy(" \t\n".to_string(), &policy(true, false)),
            Err(InputError::Empty)
        ));
        assert_eq!(
            apply_policy(" \t\n".to_string(), &policy(false, false)).unwrap(),
            " \t\n"
        );
    }

    #[test]
    fn invalid_utf8_input_is_rejected() {
        let error = decode_payload(vec![b'a', 0xc3, 0x28], &CfgInput::default()).unwrap_err();
        assert!(matches!(
            error,
            InputError::Digest(DigestError::Encoding { .. })
        ));
        assert!(error.to_string().starts_with("could not decode input to UTF-8"));
    }

    #[test]
    fn valid_utf8_input_is_decoded_before_policy() {
        let text = decode_payload(" ünïcödé\n".as_bytes().to_vec(), &policy(true, false)).unwrap();
        assert_eq!(text, "ünïcödé");
    }

    #[test]
    fn empty_argument_digest() {
        let (hex_digest, input_bytes) =
            digest_source(InputSource::Argument(String::new()), &CfgInput::default()).unwrap();
        assert_eq!(hex_digest, digest::to_sha512(""));
        assert_eq!(input_bytes, 0);
    }
}
