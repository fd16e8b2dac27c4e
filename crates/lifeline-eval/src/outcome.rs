// Copyright (c) 2025 The Lifeline Authors.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::{Deserialize, Serialize};

/// The survive / fail verdict of an evaluation.
///
/// Serialised as the symbols `"s"` and `"f"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "s")]
    Survived,
    #[serde(rename = "f")]
    Failed,
}

impl Classification {
    /// Returns `Survived` if `condition` holds, otherwise `Failed`.
    #[inline]
    pub fn from_condition(condition: bool) -> Self {
        if condition {
            Classification::Survived
        } else {
            Classification::Failed
        }
    }

    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Classification::Survived => 's',
            Classification::Failed => 'f',
        }
    }

    #[inline]
    pub fn is_survived(self) -> bool {
        self == Classification::Survived
    }

    #[inline]
    pub fn is_failed(self) -> bool {
        self == Classification::Failed
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(Classification::Survived.symbol(), 's');
        assert_eq!(Classification::Failed.to_string(), "f");
        assert_eq!(Classification::from_condition(true), Classification::Survived);
        assert!(Classification::from_condition(false).is_failed());
    }

    #[test]
    fn test_serde_uses_symbols() {
        assert_eq!(
            serde_json::to_string(&Classification::Survived).unwrap(),
            "\"s\""
        );
        let parsed: Classification = serde_json::from_str("\"f\"").unwrap();
        assert_eq!(parsed, Classification::Failed);
    }
}
