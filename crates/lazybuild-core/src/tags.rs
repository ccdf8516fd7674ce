use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::constants::INPUT_TAGS;
use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;

/// A user supplied `name` or `name:tag` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagSpec {
    pub name: String,
    pub tag: Option<String>,
}

impl TagSpec {
    pub fn canonical(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}:{}", self.name, tag),
            None => self.name.clone(),
        }
    }
}

impl Display for TagSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl FromStr for TagSpec {
    type Err = Error;

    /// Splits once on the first `:`. An empty tag after the colon is treated
    /// as no tag at all.
    fn from_str(value: &str) -> Result<Self> {
        let (name, tag) = match value.split_once(':') {
            Some((name, tag)) => (name, Some(tag)),
            None => (value, None),
        };

        if name.is_empty() {
            return Err(Error::InvalidTagSpec {
                spec: value.to_string(),
                reason: "image name is empty",
            });
        }

        Ok(Self {
            name: name.to_string(),
            tag: tag.filter(|t| !t.is_empty()).map(ToOwned::to_owned),
        })
    }
}

/// Parses every raw declaration, failing on the first malformed one.
///
/// # Errors
/// `MissingInput("tags")` when `raw` is empty, `InvalidTagSpec` when any item
/// has no image name.
pub fn parse_tag_specs(raw: &[String]) -> Result<Vec<TagSpec>> {
    if raw.is_empty() {
        return Err(Error::missing_input(INPUT_TAGS));
    }
    raw.iter().map(|item| TagSpec::from_str(item)).collect()
}

/// Image names mapped to the tags the built image should carry.
///
/// Names keep the order they were first declared in. Within a name the
/// fingerprint tag comes first, followed by explicit tags in declaration
/// order, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTagSet {
    fingerprint: Fingerprint,
    images: Vec<(String, Vec<String>)>,
}

impl ImageTagSet {
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Distinct image names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|(name, _)| name.as_str())
    }

    pub fn tags_for(&self, name: &str) -> Option<&[String]> {
        self.images
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tags)| tags.as_slice())
    }

    /// Every `name:tag` pair the image should be tagged with.
    pub fn all_tags(&self) -> Vec<String> {
        self.images
            .iter()
            .flat_map(|(name, tags)| tags.iter().map(move |tag| format!("{name}:{tag}")))
            .collect()
    }

    /// One `name:<fingerprint>` per distinct image name, in first-seen order.
    pub fn content_tags(&self) -> Vec<String> {
        self.names()
            .map(|name| format!("{name}:{}", self.fingerprint))
            .collect()
    }
}

/// Merges the fingerprint tag into the user declarations.
///
/// # Errors
/// `MissingInput("tags")` when `specs` is empty.
pub fn resolve_tags(specs: &[TagSpec], fingerprint: &Fingerprint) -> Result<ImageTagSet> {
    if specs.is_empty() {
        return Err(Error::missing_input(INPUT_TAGS));
    }

    let mut images: Vec<(String, Vec<String>)> = Vec::new();
    for spec in specs {
        let index = match images.iter().position(|(name, _)| *name == spec.name) {
            Some(index) => index,
            None => {
                images.push((spec.name.clone(), vec![fingerprint.to_string()]));
                images.len() - 1
            }
        };

        if let Some(tag) = &spec.tag {
            let tags = &mut images[index].1;
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }

    Ok(ImageTagSet {
        fingerprint: fingerprint.clone(),
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::split_list;
    use std::collections::HashSet;

    fn fingerprint() -> Fingerprint {
        Fingerprint::from_digest(&"ab".repeat(32))
    }

    fn resolve(raw: &str) -> ImageTagSet {
        let specs = parse_tag_specs(&split_list(raw)).expect("specs should parse");
        resolve_tags(&specs, &fingerprint()).expect("tags should resolve")
    }

    fn set(items: &[String]) -> HashSet<String> {
        items.iter().cloned().collect()
    }

    #[test]
    fn parses_name_only() {
        let spec = TagSpec::from_str("user/app").unwrap();
        assert_eq!(spec.name, "user/app");
        assert_eq!(spec.tag, None);
    }

    #[test]
    fn splits_on_first_colon_only() {
        let spec = TagSpec::from_str("user/app:v1:extra").unwrap();
        assert_eq!(spec.name, "user/app");
        assert_eq!(spec.tag.as_deref(), Some("v1:extra"));
    }

    #[test]
    fn trailing_colon_means_no_tag() {
        let spec = TagSpec::from_str("user/app:").unwrap();
        assert_eq!(spec.tag, None);
        assert_eq!(spec.canonical(), "user/app");
    }

    #[test]
    fn rejects_empty_name() {
        let err = TagSpec::from_str(":latest").expect_err("must fail");
        assert!(matches!(err, Error::InvalidTagSpec { .. }));
        assert!(TagSpec::from_str("").is_err());
    }

    #[test]
    fn empty_spec_list_is_missing_tags() {
        let err = parse_tag_specs(&[]).expect_err("must fail");
        match err {
            Error::MissingInput { name } => assert_eq!(name, "tags"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(resolve_tags(&[], &fingerprint()).is_err());
    }

    #[test]
    fn name_only_gets_fingerprint_tag() {
        let f = fingerprint();
        let out = resolve("user/app");
        assert_eq!(out.all_tags(), vec![format!("user/app:{f}")]);
        assert_eq!(out.content_tags(), vec![format!("user/app:{f}")]);
    }

    #[test]
    fn explicit_tag_is_preserved() {
        let f = fingerprint();
        let out = resolve("user/app:latest");
        assert_eq!(
            set(&out.all_tags()),
            set(&["user/app:latest".to_string(), format!("user/app:{f}")])
        );
        assert_eq!(out.content_tags(), vec![format!("user/app:{f}")]);
    }

    #[test]
    fn several_tags_over_several_lines() {
        let f = fingerprint();
        let out = resolve("user/app:latest, user/app:commit-abc\nuser/app:v1.2.3");
        assert_eq!(out.names().collect::<Vec<_>>(), vec!["user/app"]);
        assert_eq!(
            set(out.tags_for("user/app").unwrap()),
            set(&[
                "latest".to_string(),
                "commit-abc".to_string(),
                "v1.2.3".to_string(),
                f.to_string()
            ])
        );
        assert_eq!(out.all_tags().len(), 4);
    }

    #[test]
    fn several_image_names_share_the_fingerprint() {
        let f = fingerprint();
        let out = resolve("user/app:latest, ghr.io/user/app");
        assert_eq!(
            out.content_tags(),
            vec![format!("user/app:{f}"), format!("ghr.io/user/app:{f}")]
        );
        assert_eq!(
            set(&out.all_tags()),
            set(&[
                "user/app:latest".to_string(),
                format!("user/app:{f}"),
                format!("ghr.io/user/app:{f}"),
            ])
        );
    }

    #[test]
    fn duplicate_tags_collapse() {
        let out = resolve("user/app:latest\nuser/app:latest\nuser/app");
        assert_eq!(out.all_tags().len(), 2);
    }

    #[test]
    fn explicit_fingerprint_tag_is_not_duplicated() {
        let f = fingerprint();
        let out = resolve(&format!("user/app:{f}"));
        assert_eq!(out.all_tags(), vec![format!("user/app:{f}")]);
    }

    #[test]
    fn first_seen_name_order_is_kept() {
        let out = resolve("b/app, a/app:x, b/app:y");
        assert_eq!(out.names().collect::<Vec<_>>(), vec!["b/app", "a/app"]);
    }

    #[test]
    fn empty_list_item_is_rejected() {
        let err = parse_tag_specs(&split_list("user/app,")).expect_err("must fail");
        assert!(matches!(err, Error::InvalidTagSpec { .. }));
    }
}
