use crate::error::RetrievalError;
use crate::traits::SimilarityIndex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub chunk_id: usize,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, RetrievalError> {
        let dimensions = match vectors.first() {
            Some(first) => first.len(),
            None => return Err(RetrievalError::EmptyIndex),
        };

        if let Some(bad) = vectors.iter().find(|vector| vector.len() != dimensions) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dimensions,
                actual: bad.len(),
            });
        }

        Ok(Self {
            dimensions,
            vectors,
        })
    }

    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, RetrievalError> {
        if vector.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(chunk_id, stored)| Neighbor {
                chunk_id,
                distance: l2_distance(stored, vector),
            })
            .collect();

        neighbors.sort_by(|left, right| {
            left.distance
                .partial_cmp(&right.distance)
                .unwrap_or(Ordering::Equal)
                .then(left.chunk_id.cmp(&right.chunk_id))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    pub fn vector(&self, chunk_id: usize) -> Option<&[f32]> {
        self.vectors.get(chunk_id).map(Vec::as_slice)
    }
}

impl SimilarityIndex for FlatL2Index {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, RetrievalError> {
        FlatL2Index::query(self, vector, k)
    }
}

pub fn l2_distance(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatL2Index {
        FlatL2Index::build(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]])
            .expect("uniform vectors build")
    }

    #[test]
    fn nearest_neighbors_are_sorted_by_distance() {
        let hits = sample_index().query(&[0.0, 0.0], 2).expect("query succeeds");
        assert_eq!(
            hits,
            vec![
                Neighbor {
                    chunk_id: 0,
                    distance: 0.0
                },
                Neighbor {
                    chunk_id: 1,
                    distance: 1.0
                },
            ]
        );
    }

    #[test]
    fn distance_is_euclidean() {
        let hits = sample_index().query(&[2.0, 1.0], 3).expect("query succeeds");
        assert_eq!(hits[0].chunk_id, 1);
        assert!((hits[0].distance - 2f32.sqrt()).abs() < 1e-6);
        assert_eq!(hits[2].chunk_id, 2);
        assert!((hits[2].distance - 5.0).abs() < 1e-6);
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let index = FlatL2Index::build(vec![vec![1.0], vec![2.0]]).expect("build");
        let hits = index.query(&[0.0], 10).expect("query succeeds");
        assert_eq!(hits.len(), 2);
        assert!(index.query(&[0.0], 0).expect("query succeeds").is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = FlatL2Index::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
            vec![0.0, 0.0],
        ])
        .expect("build");
        let ids: Vec<usize> = index
            .query(&[0.0, 0.0], 4)
            .expect("query succeeds")
            .into_iter()
            .map(|hit| hit.chunk_id)
            .collect();
        assert_eq!(ids, vec![3, 0, 1, 2]);
    }

    #[test]
    fn build_rejects_empty_and_ragged_input() {
        assert!(matches!(
            FlatL2Index::build(Vec::new()),
            Err(RetrievalError::EmptyIndex)
        ));
        assert!(matches!(
            FlatL2Index::build(vec![vec![0.0, 0.0], vec![1.0]]),
            Err(RetrievalError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn query_rejects_wrong_width() {
        assert!(matches!(
            sample_index().query(&[0.0, 0.0, 0.0], 1),
            Err(RetrievalError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn trait_object_reports_shape() {
        let index: Box<dyn SimilarityIndex> = Box::new(sample_index());
        assert_eq!(index.dimensions(), 2);
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert_eq!(index.query(&[5.0, 5.0], 1).expect("query")[0].chunk_id, 2);
    }
}
