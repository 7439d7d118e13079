//! Merkle table commitment (§4.5). A "table" is a LDE domain's worth of
//! rows, each row holding one evaluation per committed column; a single
//! Merkle tree commits to all rows at once, and later opens a subset of
//! them (selected either as ordinary data queries or, for a FRI layer, as
//! integrity queries that additionally reveal a row's sibling).
//!
//! Hashing itself is delegated to `lambdaworks_crypto`'s generic
//! `MerkleTree`; only the leaf/node hashing backend is written here, using
//! Blake2s-256 per §4.6.1's hash choice for the whole transcript.

use blake2::Blake2s256;
use digest::Digest;
use lambdaworks_crypto::merkle_tree::merkle::MerkleTree as InnerMerkleTree;
use lambdaworks_crypto::merkle_tree::proof::Proof;
use lambdaworks_crypto::merkle_tree::traits::IsMerkleTreeBackend;
use std::marker::PhantomData;

use crate::field::IsField;

/// Hashes a table row (a `Vec<F>`) and, separately, hashes a parent from
/// two child digests, both with Blake2s-256 (§4.6.1).
#[derive(Clone)]
pub struct TableBackend<F: IsField> {
    _field: PhantomData<F>,
}

impl<F: IsField> Default for TableBackend<F> {
    fn default() -> Self {
        TableBackend { _field: PhantomData }
    }
}

impl<F: IsField + Send + Sync> IsMerkleTreeBackend for TableBackend<F> {
    type Node = [u8; 32];
    type Data = Vec<F>;

    fn hash_data(input: &Vec<F>) -> [u8; 32] {
        let mut hasher = Blake2s256::new();
        for element in input.iter() {
            hasher.update(element.to_bytes_le());
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    fn hash_new_parent(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let mut hasher = Blake2s256::new();
        hasher.update(left);
        hasher.update(right);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}

/// Commits to a rectangular table of field elements: `rows[i]` is the `i`th
/// leaf, holding one value per committed column.
pub struct TableCommitment<F: IsField + Send + Sync> {
    tree: InnerMerkleTree<TableBackend<F>>,
    n_rows: usize,
}

impl<F: IsField + Send + Sync> TableCommitment<F> {
    pub fn commit(rows: &[Vec<F>]) -> Self {
        let tree = InnerMerkleTree::<TableBackend<F>>::build(rows)
            .expect("table commitment requires at least one row");
        TableCommitment {
            tree,
            n_rows: rows.len(),
        }
    }

    pub fn root(&self) -> [u8; 32] {
        self.tree.root
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Opens the rows at `positions`, returning one proof per position in
    /// the same order (§4.5: "selective decommitment").
    pub fn open(&self, positions: &[usize]) -> Vec<Proof<[u8; 32]>> {
        positions
            .iter()
            .map(|&pos| {
                self.tree
                    .get_proof_by_pos(pos)
                    .expect("position out of range for this table")
            })
            .collect()
    }
}

/// One opened row plus the Merkle proof attesting to it, bundled together
/// since every caller that requests one wants both (§4.5).
pub struct TableCommitmentOpening<F: IsField> {
    pub row: Vec<F>,
    pub proof: Proof<[u8; 32]>,
}

/// Verifies a single opened row against a committed root.
pub fn verify_row<F: IsField + Send + Sync>(
    root: &[u8; 32],
    position: usize,
    row: &[F],
    proof: &Proof<[u8; 32]>,
) -> bool {
    proof.verify::<TableBackend<F>>(root, position, &row.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BaseFE;

    #[test]
    fn open_and_verify_round_trips() {
        let rows: Vec<Vec<BaseFE>> = (0..8u64)
            .map(|i| vec![BaseFE::new(i), BaseFE::new(i * 2)])
            .collect();
        let commitment = TableCommitment::commit(&rows);
        let proofs = commitment.open(&[0, 5]);

        assert!(verify_row(&commitment.root(), 0, &rows[0], &proofs[0]));
        assert!(verify_row(&commitment.root(), 5, &rows[1], &proofs[1]));
    }

    #[test]
    fn tampered_row_fails_verification() {
        let rows: Vec<Vec<BaseFE>> = (0..8u64).map(|i| vec![BaseFE::new(i)]).collect();
        let commitment = TableCommitment::commit(&rows);
        let proofs = commitment.open(&[2]);
        let tampered = vec![BaseFE::new(999)];
        assert!(!verify_row(&commitment.root(), 2, &tampered, &proofs[0]));
    }
}
