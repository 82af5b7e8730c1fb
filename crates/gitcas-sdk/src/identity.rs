//! Who made a commit, and when.

use gitcas_types::{GitTime, Signature, TzOffset};

use crate::config::IdentityConfig;
use crate::error::SdkResult;

/// Source of commit timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> GitTime;
}

/// Wall-clock time, in a fixed offset or the local one.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    offset: Option<TzOffset>,
}

impl SystemClock {
    /// Record times in the local timezone.
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// Record times in `offset`.
    pub fn with_offset(offset: TzOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> GitTime {
        match self.offset {
            Some(offset) => GitTime::now(offset),
            None => GitTime::now_local(),
        }
    }
}

/// Always returns the same time.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub GitTime);

impl Clock for FixedClock {
    fn now(&self) -> GitTime {
        self.0
    }
}

/// Supplies author and committer signatures for a new commit.
pub trait IdentityProvider: Send + Sync {
    /// `(author, committer)`, stamped with the current time.
    fn signatures(&self) -> SdkResult<(Signature, Signature)>;
}

/// One name/email pair used as both author and committer.
pub struct ConfiguredIdentity {
    name: String,
    email: String,
    clock: Box<dyn Clock>,
}

impl ConfiguredIdentity {
    /// Fails if the name or email cannot appear in a signature line.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        clock: impl Clock + 'static,
    ) -> SdkResult<Self> {
        let name = name.into();
        let email = email.into();
        Signature::new(name.as_str(), email.as_str(), GitTime::new(0, TzOffset::UTC))?;
        Ok(Self {
            name,
            email,
            clock: Box::new(clock),
        })
    }

    /// Build from configuration with a [`SystemClock`].
    pub fn from_config(config: &IdentityConfig) -> SdkResult<Self> {
        let clock = match config.offset()? {
            Some(offset) => SystemClock::with_offset(offset),
            None => SystemClock::local(),
        };
        Self::new(config.name.as_str(), config.email.as_str(), clock)
    }
}

impl IdentityProvider for ConfiguredIdentity {
    fn signatures(&self) -> SdkResult<(Signature, Signature)> {
        let sig = Signature::new(self.name.as_str(), self.email.as_str(), self.clock.now())?;
        Ok((sig.clone(), sig))
    }
}

impl std::fmt::Debug for ConfiguredIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredIdentity")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
