//! Greedy first-fit clustering over fingerprinted records.
//!
//! Each record is compared against the *current* representative of every
//! live cluster, in creation order, and joins the first one it matches. A
//! record that matches nothing opens a new cluster at the end of the list.
//! Because representatives can change mid-pass, the outcome depends on input
//! order; callers must feed records in directory-listing order to get
//! reproducible results.

use super::select::supersedes;
use super::similarity::SimilarityThreshold;
use crate::types::{Discarded, ImageRecord};

/// A group of visually similar images, reduced to its best member.
#[derive(Debug, Clone)]
pub struct Cluster {
    representative: ImageRecord,
}

impl Cluster {
    pub fn representative(&self) -> &ImageRecord {
        &self.representative
    }
}

/// Result of a clustering pass.
#[derive(Debug, Default)]
pub struct Assignment {
    /// Surviving representatives in cluster creation order
    pub representatives: Vec<ImageRecord>,
    /// Every record that lost its cluster's representative contest
    pub discarded: Vec<Discarded>,
}

/// Sequential first-fit cluster assigner.
#[derive(Debug)]
pub struct ClusterAssigner {
    threshold: SimilarityThreshold,
    clusters: Vec<Cluster>,
    discarded: Vec<Discarded>,
}

impl ClusterAssigner {
    pub fn new(threshold: SimilarityThreshold) -> Self {
        Self {
            threshold,
            clusters: Vec::new(),
            discarded: Vec::new(),
        }
    }

    /// Cluster `records` in the given order.
    pub fn assign<I>(threshold: SimilarityThreshold, records: I) -> Assignment
    where
        I: IntoIterator<Item = ImageRecord>,
    {
        let mut assigner = Self::new(threshold);
        for record in records {
            assigner.push(record);
        }
        assigner.finish()
    }

    /// Feed the next record.
    ///
    /// Returns the index of the cluster the record was compared into.
    pub fn push(&mut self, record: ImageRecord) -> usize {
        let threshold = self.threshold;
        let matched = self.clusters.iter().position(|cluster| {
            threshold.is_similar(&cluster.representative.fingerprint, &record.fingerprint)
        });

        let Some(index) = matched else {
            tracing::debug!(
                "New cluster {} for {:?}",
                self.clusters.len(),
                record.file_name
            );
            self.clusters.push(Cluster {
                representative: record,
            });
            return self.clusters.len() - 1;
        };

        let cluster = &mut self.clusters[index];
        let loser = if supersedes(&record, &cluster.representative) {
            tracing::debug!(
                "{:?} ({} bytes) replaces {:?} ({} bytes) in cluster {}",
                record.file_name,
                record.byte_size,
                cluster.representative.file_name,
                cluster.representative.byte_size,
                index
            );
            std::mem::replace(&mut cluster.representative, record)
        } else {
            tracing::debug!(
                "{:?} folded into cluster {} (kept {:?})",
                record.file_name,
                index,
                cluster.representative.file_name
            );
            record
        };

        self.discarded.push(Discarded {
            path: loser.path,
            superseded_by: cluster.representative.path.clone(),
            cluster: index,
        });
        index
    }

    /// Live clusters in creation order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn finish(self) -> Assignment {
        Assignment {
            representatives: self
                .clusters
                .into_iter()
                .map(|cluster| cluster.representative)
                .collect(),
            discarded: self.discarded,
        }
    }
}
