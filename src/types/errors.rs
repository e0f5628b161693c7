use std::fmt;

use crate::types::tab::TabId;

// === FrameBufferError ===

/// Errors related to frame buffer allocation and pixel copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameBufferError {
    /// Requested dimensions are non-positive or exceed the hard ceilings.
    InvalidSize(i32, i32),
    /// The allocator refused the requested backing storage.
    OutOfMemory,
    /// The source pixel slice is null/empty.
    NullSource,
    /// The destination buffer has no backing storage.
    InvalidDestination,
    /// The destination's recorded size disagrees with the paint size, or the
    /// source slice is too short for the declared dimensions.
    SizeMismatch,
}

impl fmt::Display for FrameBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBufferError::InvalidSize(w, h) => {
                write!(f, "Invalid buffer size: {}x{}", w, h)
            }
            FrameBufferError::OutOfMemory => write!(f, "Buffer allocation failed"),
            FrameBufferError::NullSource => write!(f, "Source pixel data is null"),
            FrameBufferError::InvalidDestination => {
                write!(f, "Destination buffer is not allocated")
            }
            FrameBufferError::SizeMismatch => {
                write!(f, "Buffer size does not match paint size")
            }
        }
    }
}

impl std::error::Error for FrameBufferError {}

// === TabError ===

/// Errors related to tab registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabError {
    /// Tab with the given ID was not found.
    NotFound(TabId),
    /// The provided tab index is out of bounds.
    IndexOutOfRange(usize),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
            TabError::IndexOutOfRange(index) => write!(f, "Tab index out of range: {}", index),
        }
    }
}

impl std::error::Error for TabError {}

// === ControllerError ===

/// Errors related to window controller routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// A routing call found no engine handle attached yet (the tab's engine
    /// instance is still initializing, or every tab is closed).
    EngineUnavailable,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::EngineUnavailable => write!(f, "No engine instance available"),
        }
    }
}

impl std::error::Error for ControllerError {}

// === ScreenshotError ===

/// Errors related to frame capture.
#[derive(Debug)]
pub enum ScreenshotError {
    /// The tab has not painted a frame yet.
    NoFrame,
    /// PNG encoding failed.
    EncodeFailed(String),
}

impl fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenshotError::NoFrame => write!(f, "No frame data available"),
            ScreenshotError::EncodeFailed(msg) => write!(f, "Screenshot encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for ScreenshotError {}

// === CryptoError ===

/// Errors related to sealing secrets at rest.
#[derive(Debug)]
pub enum CryptoError {
    /// Failed to create or read the device key file.
    KeyStore(String),
    /// Encryption operation failed.
    Encryption(String),
    /// Decryption operation failed.
    Decryption(String),
    /// Failed to generate random bytes.
    RandomGeneration(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::KeyStore(msg) => write!(f, "Device key store error: {}", msg),
            CryptoError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            CryptoError::Decryption(msg) => write!(f, "Decryption failed: {}", msg),
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for CryptoError {}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug)]
pub enum ShortcutError {
    /// Shortcut for the given action was not found.
    NotFound(String),
    /// The shortcut keys conflict with an existing binding.
    Conflict(String),
    /// The provided key combination is invalid.
    InvalidKeys(String),
}

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutError::NotFound(action) => {
                write!(f, "Shortcut not found for action: {}", action)
            }
            ShortcutError::Conflict(msg) => write!(f, "Shortcut conflict: {}", msg),
            ShortcutError::InvalidKeys(keys) => write!(f, "Invalid shortcut keys: {}", keys),
        }
    }
}

impl std::error::Error for ShortcutError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === AIError ===

/// Errors related to the chat assistant.
#[derive(Debug)]
pub enum AIError {
    /// No AI provider has been configured.
    NoProvider,
    /// No API key is stored for the active provider.
    MissingApiKey(String),
    /// A network error occurred while communicating with the provider.
    NetworkError(String),
    /// The provider rate-limited the request.
    RateLimited(String),
    /// The provider returned an error or an unparseable response.
    ProviderError(String),
}

impl fmt::Display for AIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AIError::NoProvider => write!(f, "No AI provider configured"),
            AIError::MissingApiKey(provider) => {
                write!(f, "No API key stored for provider: {}", provider)
            }
            AIError::NetworkError(msg) => write!(f, "AI network error: {}", msg),
            AIError::RateLimited(msg) => write!(f, "AI rate limited: {}", msg),
            AIError::ProviderError(msg) => write!(f, "AI provider error: {}", msg),
        }
    }
}

impl std::error::Error for AIError {}
