//! Shared types for CLI commands.

use clap::Args;

use crate::slideshow::{Filter, MediaType};

/// Playlist filter flags shared by `run` and `list`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Only entries of this media type (image, video, html, gif, application).
    #[arg(long = "type", value_name = "TYPE")]
    pub media_type: Option<MediaType>,

    /// Only entries carrying this tag. Subdirectory names become tags.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Only entries whose name or tags contain this text.
    #[arg(long, value_name = "TEXT")]
    pub keyword: Option<String>,
}

impl FilterArgs {
    /// Returns whether any filter flag was given.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.media_type.is_some() || self.tag.is_some() || self.keyword.is_some()
    }

    /// Applies the given flags on top of `base`. Flags that were not given
    /// keep the base value.
    #[must_use]
    pub fn merge_into(&self, base: Filter) -> Filter {
        Filter {
            media_type: self.media_type.or(base.media_type),
            tag: self.tag.clone().or(base.tag),
            keyword: self.keyword.clone().or(base.keyword),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args_keep_base_filter() {
        let base = Filter {
            media_type: Some(MediaType::Gif),
            tag: Some("nature".to_string()),
            keyword: None,
        };
        let args = FilterArgs::default();

        assert!(!args.is_set());
        assert_eq!(args.merge_into(base.clone()), base);
    }

    #[test]
    fn test_flags_override_base_filter() {
        let base = Filter {
            media_type: Some(MediaType::Gif),
            tag: Some("nature".to_string()),
            keyword: None,
        };
        let args = FilterArgs {
            media_type: Some(MediaType::Image),
            tag: None,
            keyword: Some("sunset".to_string()),
        };

        let merged = args.merge_into(base);
        assert!(args.is_set());
        assert_eq!(merged.media_type, Some(MediaType::Image));
        assert_eq!(merged.tag.as_deref(), Some("nature"));
        assert_eq!(merged.keyword.as_deref(), Some("sunset"));
    }
}
