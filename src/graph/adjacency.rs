use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::model::AdjacencyList;
use crate::utils::error::Result;

/// Stable node-id ⇄ dense-index mapping. Ids are sorted so the same graph
/// always yields the same indexing regardless of insertion order.
#[derive(Debug, Clone)]
pub struct NodeIndex {
    ids: Vec<i64>,
    positions: HashMap<i64, usize>,
}

impl NodeIndex {
    /// The node set is the union of every key and every list member, so
    /// nodes that only appear on one side are still covered.
    pub fn from_adjacency(adj: &AdjacencyList) -> Self {
        let mut set: BTreeSet<i64> = adj.keys().copied().collect();
        for members in adj.values() {
            set.extend(members.iter().copied());
        }

        let ids: Vec<i64> = set.into_iter().collect();
        let positions = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self { ids, positions }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, position: usize) -> i64 {
        self.ids[position]
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

/// Symmetric 0/1 adjacency matrix over a `NodeIndex`.
#[derive(Debug, Clone)]
pub struct AdjMatrix {
    n: usize,
    rows: Vec<Vec<u8>>,
}

impl AdjMatrix {
    pub fn from_adjacency(adj: &AdjacencyList, index: &NodeIndex) -> Self {
        let n = index.len();
        let mut rows = vec![vec![0u8; n]; n];

        for (&from, members) in adj {
            let i = index.position(from).expect("key indexed");
            for &to in members {
                let j = index.position(to).expect("member indexed");
                if i != j {
                    rows[i][j] = 1;
                    rows[j][i] = 1;
                }
            }
        }

        Self { n, rows }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn is_edge(&self, i: usize, j: usize) -> bool {
        self.rows[i][j] == 1
    }

    pub fn row(&self, i: usize) -> &[u8] {
        &self.rows[i]
    }

    /// Per-node neighbor index lists, in index order.
    pub fn neighbor_lists(&self) -> Vec<Vec<usize>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, &v)| v == 1)
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect()
    }
}

/// Parse an adjacency file as written by the collector: a JSON object with
/// string user-id keys and arrays of neighbor ids.
pub fn adjacency_from_json(json: &str) -> Result<AdjacencyList> {
    let raw: BTreeMap<String, Vec<i64>> = serde_json::from_str(json)?;

    let mut adj = AdjacencyList::new();
    for (key, members) in raw {
        let id = key
            .parse::<i64>()
            .map_err(|_| crate::utils::error::EgonetError::ProcessingError {
                message: format!("adjacency key '{}' is not a user id", key),
            })?;
        adj.insert(id, members);
    }
    Ok(adj)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AdjacencyList {
        // Ego 1 with friends 2, 3, 4; 2 and 3 are mutual friends.
        let mut adj = AdjacencyList::new();
        adj.insert(1, vec![2, 3, 4]);
        adj.insert(2, vec![3]);
        adj.insert(3, vec![2]);
        adj
    }

    #[test]
    fn test_index_covers_keys_and_members() {
        let index = NodeIndex::from_adjacency(&sample());
        assert_eq!(index.len(), 4);
        assert_eq!(index.ids(), &[1, 2, 3, 4]);
        assert_eq!(index.position(4), Some(3));
        assert_eq!(index.position(99), None);
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let adj = sample();
        let index = NodeIndex::from_adjacency(&adj);
        let matrix = AdjMatrix::from_adjacency(&adj, &index);

        for i in 0..matrix.len() {
            for j in 0..matrix.len() {
                assert_eq!(matrix.is_edge(i, j), matrix.is_edge(j, i));
            }
        }

        let e1 = index.position(1).unwrap();
        let e4 = index.position(4).unwrap();
        assert!(matrix.is_edge(e1, e4));
        let e2 = index.position(2).unwrap();
        assert!(!matrix.is_edge(e2, e4));
    }

    #[test]
    fn test_self_loops_are_dropped() {
        let mut adj = AdjacencyList::new();
        adj.insert(1, vec![1, 2]);
        let index = NodeIndex::from_adjacency(&adj);
        let matrix = AdjMatrix::from_adjacency(&adj, &index);

        let p1 = index.position(1).unwrap();
        assert!(!matrix.is_edge(p1, p1));
    }

    #[test]
    fn test_neighbor_lists_match_matrix() {
        let adj = sample();
        let index = NodeIndex::from_adjacency(&adj);
        let matrix = AdjMatrix::from_adjacency(&adj, &index);
        let neighbors = matrix.neighbor_lists();

        let p1 = index.position(1).unwrap();
        let p2 = index.position(2).unwrap();
        let p3 = index.position(3).unwrap();
        let p4 = index.position(4).unwrap();

        assert_eq!(neighbors[p1], vec![p2, p3, p4]);
        assert_eq!(neighbors[p4], vec![p1]);
    }

    #[test]
    fn test_adjacency_from_json_round_trip() {
        let json = r#"{"1": [2, 3], "2": [3]}"#;
        let adj = adjacency_from_json(json).unwrap();
        assert_eq!(adj.get(&1), Some(&vec![2, 3]));
        assert_eq!(adj.get(&2), Some(&vec![3]));
    }

    #[test]
    fn test_adjacency_from_json_rejects_bad_keys() {
        assert!(adjacency_from_json(r#"{"alice": [2]}"#).is_err());
        assert!(adjacency_from_json("not json").is_err());
    }
}
