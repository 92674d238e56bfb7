use std::fmt;

/// How many characters of a partially shown value stay visible at each end
pub const PARTIAL_SHOW_CHARS: usize = 6;

/// A wrapper for sensitive data that implements safe Display
#[derive(Clone, Debug)]
pub struct SensitiveData<T> {
    inner: T,
    data_type: SensitiveDataType,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum SensitiveDataType {
    /// Lightning invoice (bolt11)
    LightningInvoice,
    /// Daemon Basic auth password
    DaemonPassword,
    /// Dashboard bearer token
    BearerToken,
}

impl SensitiveDataType {
    fn display_name(&self) -> &'static str {
        match self {
            Self::LightningInvoice => "invoice",
            Self::DaemonPassword => "password",
            Self::BearerToken => "token",
        }
    }

    /// Whether the ends of the value may be shown
    fn shows_partial(&self) -> bool {
        matches!(self, Self::LightningInvoice)
    }
}

impl<T: fmt::Display> SensitiveData<T> {
    pub fn new(data: T, data_type: SensitiveDataType) -> Self {
        Self {
            inner: data,
            data_type,
        }
    }

    fn sanitized_repr(&self) -> String {
        let original = self.inner.to_string();
        let label = self.data_type.display_name().to_uppercase();

        let len = original.len();
        if !self.data_type.shows_partial()
            || len <= PARTIAL_SHOW_CHARS * 2
            || !original.is_char_boundary(PARTIAL_SHOW_CHARS)
            || !original.is_char_boundary(len - PARTIAL_SHOW_CHARS)
        {
            return format!("[REDACTED_{}]", label);
        }

        let start = &original[..PARTIAL_SHOW_CHARS];
        let end = &original[len - PARTIAL_SHOW_CHARS..];
        let middle_len = len - (PARTIAL_SHOW_CHARS * 2);

        format!("{}[REDACTED_{}_{}_CHARS]{}", start, label, middle_len, end)
    }
}

impl<T: fmt::Display> fmt::Display for SensitiveData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sanitized_repr())
    }
}

pub fn sanitize_invoice<T: fmt::Display>(invoice: T) -> SensitiveData<T> {
    SensitiveData::new(invoice, SensitiveDataType::LightningInvoice)
}

pub fn sanitize_password<T: fmt::Display>(password: T) -> SensitiveData<T> {
    SensitiveData::new(password, SensitiveDataType::DaemonPassword)
}

pub fn sanitize_token<T: fmt::Display>(token: T) -> SensitiveData<T> {
    SensitiveData::new(token, SensitiveDataType::BearerToken)
}
