//! Optional support compiled into this build

/// Optional library support, fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    /// Image library (gd) support
    pub image_support: bool,

    /// libswscale linked in
    pub scaler: bool,
}

impl FeatureSet {
    /// Features of the running build
    pub const fn current() -> Self {
        Self {
            image_support: cfg!(feature = "gd"),
            scaler: cfg!(feature = "swscale"),
        }
    }

    /// Host-facing label for a flag
    pub fn label(enabled: bool) -> &'static str {
        if enabled {
            "enabled"
        } else {
            "disabled"
        }
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_matches_cfg() {
        let features = FeatureSet::current();
        assert_eq!(features.image_support, cfg!(feature = "gd"));
        assert_eq!(features.scaler, cfg!(feature = "swscale"));
    }

    #[test]
    fn test_label() {
        assert_eq!(FeatureSet::label(true), "enabled");
        assert_eq!(FeatureSet::label(false), "disabled");
    }
}
