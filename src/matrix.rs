//! Symmetric distance matrix and its text loader.
//!
//! # File format
//!
//! ```text
//! 4
//! 0
//! 10 0
//! 35 20 0
//! 40 25 30 0
//! ```
//!
//! The first non-blank line holds the node count `n`. Each of the next `n`
//! non-blank rows holds whitespace-separated non-negative integers. Row `i`
//! must contain at least `i + 1` values (the lower triangle including the
//! diagonal) and at most `n`; every value at `(i, j)` is mirrored to
//! `(j, i)`, so both lower-triangular and full matrices are accepted.
//!
//! Every constructor rejects matrices whose largest entry times `n`
//! overflows [`Cost`], so no tour cost can overflow.

use std::path::Path;
use std::str::FromStr;

use crate::error::{InputFormatError, TspError};
use crate::ga::Cost;

/// Immutable `n x n` matrix of pairwise travel costs.
///
/// Symmetric with a zero diagonal by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<Cost>,
}

impl DistanceMatrix {
    /// Builds a matrix from explicit rows.
    ///
    /// Rejects empty, non-square, asymmetric or non-zero-diagonal input.
    ///
    /// ```
    /// use tsp_ga::DistanceMatrix;
    ///
    /// let m = DistanceMatrix::from_rows(vec![
    ///     vec![0, 3],
    ///     vec![3, 0],
    /// ]).unwrap();
    /// assert_eq!(m.get(1, 0), 3);
    /// ```
    pub fn from_rows(rows: Vec<Vec<Cost>>) -> Result<Self, TspError> {
        let n = rows.len();
        if n == 0 {
            return Err(InputFormatError::EmptyMatrix.into());
        }
        if rows.iter().any(|row| row.len() != n) {
            return Err(InputFormatError::NotSquare.into());
        }
        let data: Vec<Cost> = rows.into_iter().flatten().collect();
        for i in 0..n {
            let d = data[i * n + i];
            if d != 0 {
                return Err(InputFormatError::NonZeroDiagonal { node: i, value: d }.into());
            }
            for j in (i + 1)..n {
                if data[i * n + j] != data[j * n + i] {
                    return Err(InputFormatError::Asymmetric { i, j }.into());
                }
            }
        }
        Self::bounded(n, data)
    }

    /// Rejects matrices where a tour of `n` maximal edges overflows.
    fn bounded(n: usize, data: Vec<Cost>) -> Result<Self, TspError> {
        let max = data.iter().copied().max().unwrap_or(0);
        if max.checked_mul(n as Cost).is_none() {
            return Err(InputFormatError::CostOverflow { nodes: n, max }.into());
        }
        Ok(Self { n, data })
    }

    /// Reads and parses a matrix file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TspError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InputFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always `false`: construction rejects empty matrices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Cost of travelling between `from` and `to`.
    ///
    /// # Panics
    /// Panics if either index is `>= len()`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> Cost {
        assert!(from < self.n && to < self.n, "node index out of range");
        self.data[from * self.n + to]
    }

    /// Row `from` as a slice.
    #[inline]
    pub fn row(&self, from: usize) -> &[Cost] {
        &self.data[from * self.n..(from + 1) * self.n]
    }
}

impl FromStr for DistanceMatrix {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(no, line)| (no + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (_, size_line) = lines.next().ok_or(InputFormatError::MissingSize)?;
        let n: usize = size_line
            .parse()
            .map_err(|_| InputFormatError::InvalidSize(size_line.to_string()))?;
        if n == 0 {
            return Err(InputFormatError::EmptyMatrix.into());
        }

        let mut rows: Vec<Vec<Cost>> = Vec::new();
        for row in 0..n {
            let (_, line) = lines
                .next()
                .ok_or(InputFormatError::MissingRows {
                    expected: n,
                    found: row,
                })?;
            let values = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<Cost>().map_err(|_| InputFormatError::InvalidValue {
                        row,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<Cost>, _>>()?;

            if values.len() < row + 1 {
                return Err(InputFormatError::RowTooShort {
                    row,
                    expected: row + 1,
                    found: values.len(),
                }
                .into());
            }
            if values.len() > n {
                return Err(InputFormatError::RowTooLong {
                    row,
                    max: n,
                    found: values.len(),
                }
                .into());
            }
            if values[row] != 0 {
                return Err(InputFormatError::NonZeroDiagonal {
                    node: row,
                    value: values[row],
                }
                .into());
            }

            rows.push(values);
        }

        if let Some((line, _)) = lines.next() {
            return Err(InputFormatError::TrailingData { line }.into());
        }

        // All n rows are present and row i holds at least i + 1 values, so
        // the buffer is bounded by the input size.
        let mut data = vec![0 as Cost; n * n];
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                data[row * n + col] = value;
                data[col * n + row] = value;
            }
        }
        Self::bounded(n, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LOWER: &str = "4\n0\n10 0\n35 20 0\n40 25 30 0\n";

    #[test]
    fn test_parse_lower_triangle_is_mirrored() {
        let m: DistanceMatrix = LOWER.parse().unwrap();
        assert_eq!(m.len(), 4);
        assert_eq!(m.get(0, 1), 10);
        assert_eq!(m.get(1, 0), 10);
        assert_eq!(m.get(3, 2), 30);
        assert_eq!(m.get(2, 3), 30);
        for i in 0..4 {
            assert_eq!(m.get(i, i), 0);
        }
    }

    #[test]
    fn test_parse_full_matrix() {
        let text = "3\n0 1 2\n1 0 3\n2 3 0\n";
        let m: DistanceMatrix = text.parse().unwrap();
        assert_eq!(m.row(2), &[2, 3, 0]);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_padding() {
        let text = "\n  2  \n\n0\n  7   0 \n\n";
        let m: DistanceMatrix = text.parse().unwrap();
        assert_eq!(m.get(0, 1), 7);
    }

    #[test]
    fn test_parse_rejects_bad_size() {
        let err = "abc\n0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::InvalidSize(_))
        ));

        let err = "".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::MissingSize)
        ));

        let err = "0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::EmptyMatrix)
        ));
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let err = "3\n0\n5\n1 2 0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::RowTooShort {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_parse_rejects_missing_rows() {
        let err = "3\n0\n5 0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::MissingRows {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_parse_rejects_trailing_rows() {
        let err = "2\n0\n5 0\n9 9\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::TrailingData { line: 4 })
        ));
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage_values() {
        let err = "2\n0\n-5 0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::InvalidValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_nonzero_diagonal() {
        let err = "2\n1\n5 0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::NonZeroDiagonal { node: 0, value: 1 })
        ));
    }

    #[test]
    fn test_parse_rejects_long_row() {
        let err = "2\n0 1 2\n1 0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::RowTooLong { row: 0, .. })
        ));
    }

    #[test]
    fn test_parse_huge_size_with_few_rows() {
        let err = "3000000000\n0\n".parse::<DistanceMatrix>().unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::MissingRows {
                expected: 3_000_000_000,
                found: 1
            })
        ));
    }

    #[test]
    fn test_parse_rejects_costs_that_can_overflow_a_tour() {
        let err = "2\n0\n9223372036854775808 0\n"
            .parse::<DistanceMatrix>()
            .unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::CostOverflow { nodes: 2, .. })
        ));

        let m: DistanceMatrix = "2\n0\n9223372036854775807 0\n".parse().unwrap();
        assert_eq!(m.get(0, 1), 9_223_372_036_854_775_807);
    }

    #[test]
    fn test_from_rows_rejects_overflowing_costs() {
        let big = u64::MAX / 2;
        assert!(matches!(
            DistanceMatrix::from_rows(vec![
                vec![0, big, 1],
                vec![big, 0, 1],
                vec![1, 1, 0],
            ]),
            Err(TspError::InputFormat(InputFormatError::CostOverflow { nodes: 3, max }))
                if max == big
        ));
    }

    #[test]
    fn test_from_rows_validation() {
        assert!(DistanceMatrix::from_rows(vec![]).is_err());
        assert!(DistanceMatrix::from_rows(vec![vec![0, 1], vec![1]]).is_err());
        assert!(matches!(
            DistanceMatrix::from_rows(vec![vec![0, 1], vec![2, 0]]),
            Err(TspError::InputFormat(InputFormatError::Asymmetric { i: 0, j: 1 }))
        ));
        assert!(DistanceMatrix::from_rows(vec![vec![0]]).is_ok());
    }

    #[test]
    fn test_from_path_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LOWER.as_bytes()).unwrap();
        let m = DistanceMatrix::from_path(file.path()).unwrap();
        assert_eq!(m.get(2, 0), 35);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = DistanceMatrix::from_path("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(
            err,
            TspError::InputFormat(InputFormatError::Io { .. })
        ));
    }
}
