use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except ASCII alphanumerics and `-._` gets percent-encoded,
/// `%` included, which keeps the mapping identity -> file name injective.
const FILENAME_ESCAPED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Owned storage partition key, usually an email-like string handed over
/// by the authentication layer. The format is not validated.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IdentityString(String);

#[derive(Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct IdentityStr(str);

impl IdentityString {
    pub fn new(identity: impl Into<String>) -> Self {
        IdentityString(identity.into())
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl IdentityStr {
    pub fn new(identity: &str) -> &IdentityStr {
        // SAFETY: IdentityStr is a repr(transparent) wrapper around str
        unsafe { &*(identity as *const str as *const IdentityStr) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity in a form usable as a part of a file name: no path
    /// separators, no `..` components on its own, distinct for distinct
    /// identities.
    pub fn to_filename_part(&self) -> String {
        utf8_percent_encode(&self.0, FILENAME_ESCAPED).to_string()
    }
}

impl Deref for IdentityString {
    type Target = IdentityStr;

    fn deref(&self) -> &IdentityStr {
        IdentityStr::new(&self.0)
    }
}

impl Borrow<IdentityStr> for IdentityString {
    fn borrow(&self) -> &IdentityStr {
        self
    }
}

impl AsRef<IdentityStr> for IdentityString {
    fn as_ref(&self) -> &IdentityStr {
        self
    }
}

impl ToOwned for IdentityStr {
    type Owned = IdentityString;

    fn to_owned(&self) -> IdentityString {
        IdentityString(self.0.to_owned())
    }
}

impl From<String> for IdentityString {
    fn from(value: String) -> Self {
        IdentityString(value)
    }
}

impl From<&str> for IdentityString {
    fn from(value: &str) -> Self {
        IdentityString(value.to_owned())
    }
}

impl Display for IdentityString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Display for IdentityStr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
