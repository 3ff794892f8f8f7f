//! Property-test run profile parsing for CI and local overrides.

use std::env;

/// Environment variable controlling proptest case counts.
pub const PROPTEST_CASES_ENV_KEY: &str = "PROPTEST_CASES";

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads a profile, taking the case count from `PROPTEST_CASES` when it
    /// holds a positive integer and from `default_cases` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use linkdrift_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// assert!(!profile.fork());
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, fork: bool) -> Self {
        let cases = match env::var(PROPTEST_CASES_ENV_KEY) {
            Ok(raw) => parse_cases(&raw).unwrap_or_else(|reason| {
                tracing::warn!(
                    env = PROPTEST_CASES_ENV_KEY,
                    raw = %raw,
                    reason,
                    "invalid property-test case override; using default",
                );
                default_cases
            }),
            Err(_) => default_cases,
        };
        Self { cases, fork }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run proptest cases in forked subprocesses.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

fn parse_cases(raw: &str) -> Result<u32, &'static str> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("cases must be positive"),
        Ok(cases) => Ok(cases),
        Err(_) => Err("cases must be an unsigned integer"),
    }
}
