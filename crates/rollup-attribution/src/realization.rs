//! Realized / unrealized views of a layer.

use rollup_math::IrrConfig;

use crate::config::{EngineConfig, RealizationBucket, RealizationConfig};
use crate::error::AttributionResult;
use crate::layer::ReportingLayer;

/// A layer's children split by realization bucket.
#[derive(Debug, Clone)]
pub struct RealizationSplit {
    /// Children in the realized bucket.
    pub realized: Option<ReportingLayer>,
    /// Children in the unrealized bucket.
    pub unrealized: Option<ReportingLayer>,
}

impl RealizationSplit {
    /// The side for `bucket`.
    #[must_use]
    pub fn get(&self, bucket: RealizationBucket) -> Option<&ReportingLayer> {
        match bucket {
            RealizationBucket::Realized => self.realized.as_ref(),
            RealizationBucket::Unrealized => self.unrealized.as_ref(),
        }
    }
}

/// Maps child layers of a realization-status grouping to buckets.
///
/// Children are expected to be named `"{attribute} - {status}"`; the status
/// is looked up in the configured mapping.
#[derive(Debug, Clone)]
pub struct RealizationBucketMatcher {
    config: RealizationConfig,
    irr_config: IrrConfig,
}

impl RealizationBucketMatcher {
    /// Creates a matcher.
    #[must_use]
    pub fn new(config: RealizationConfig, irr_config: IrrConfig) -> Self {
        Self { config, irr_config }
    }

    /// Creates a matcher from the engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.realization.clone(), config.irr)
    }

    /// The realization settings.
    #[must_use]
    pub fn config(&self) -> &RealizationConfig {
        &self.config
    }

    /// Status part of a child layer name.
    #[must_use]
    pub fn status_of<'a>(&self, layer_name: &'a str) -> &'a str {
        let prefix = format!("{} - ", self.config.attribute);
        layer_name.strip_prefix(prefix.as_str()).unwrap_or(layer_name)
    }

    /// Bucket of a child layer name, if its status is mapped.
    #[must_use]
    pub fn classify(&self, layer_name: &str) -> Option<RealizationBucket> {
        self.config.classify(self.status_of(layer_name))
    }

    /// Children of `layer` that fall in `bucket`.
    ///
    /// With `include_unknown`, children whose status is unmapped are taken
    /// too. Several matches are merged into one layer named by joining their
    /// names with `" & "`; a single match is returned as is.
    ///
    /// # Errors
    ///
    /// Only fails if merging the matches fails.
    pub fn get_bucket(
        &self,
        layer: &ReportingLayer,
        bucket: RealizationBucket,
        include_unknown: bool,
    ) -> AttributionResult<Option<ReportingLayer>> {
        let mut matches: Vec<ReportingLayer> = layer
            .children()
            .iter()
            .filter(|child| match self.classify(child.name()) {
                Some(b) => b == bucket,
                None => include_unknown,
            })
            .cloned()
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => {
                let name = matches
                    .iter()
                    .map(ReportingLayer::name)
                    .collect::<Vec<_>>()
                    .join(" & ");
                tracing::debug!(bucket = %bucket, merged = %name, "merged realization children");
                Ok(Some(ReportingLayer::aggregate(name, matches, &self.irr_config)?))
            }
        }
    }

    /// Both buckets, with unmapped statuses folded into the configured
    /// `unknown_bucket`.
    pub fn split(&self, layer: &ReportingLayer) -> AttributionResult<RealizationSplit> {
        let unknown = self.config.unknown_bucket;
        Ok(RealizationSplit {
            realized: self.get_bucket(
                layer,
                RealizationBucket::Realized,
                unknown == RealizationBucket::Realized,
            )?,
            unrealized: self.get_bucket(
                layer,
                RealizationBucket::Unrealized,
                unknown == RealizationBucket::Unrealized,
            )?,
        })
    }
}
