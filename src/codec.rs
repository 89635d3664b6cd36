use std::fmt::Write;
use std::io::Read;

use crate::error::MatrixError;
use crate::matrix::{Element, Matrix};

const ROW_SEPARATOR: char = ';';

fn parse_row(row: &str, index: usize) -> Result<Vec<Element>, MatrixError> {
    row.split_whitespace()
        .map(|token| {
            token.parse::<Element>().map_err(|e| {
                MatrixError::MalformedInput(format!(
                    "row {index}: token {token:?} is not an integer: {e}"
                ))
            })
        })
        .collect()
}

impl Matrix {
    /// Parse the one-line text encoding.
    ///
    /// Rows are separated by `;` and values within a row by spaces.
    /// The number of values in the first row gives the size of
    /// the matrix; all rows, and the number of rows, must match it.
    /// Empty row segments and extra whitespace are ignored.
    ///
    /// # Errors
    ///
    /// [`MatrixError::MalformedInput`] if the input is empty,
    /// a token is not an `i32`, or the rows do not form a square.
    pub fn decode(text: &str) -> Result<Self, MatrixError> {
        let rows = text
            .split(ROW_SEPARATOR)
            .filter(|row| !row.trim().is_empty())
            .enumerate()
            .map(|(index, row)| parse_row(row, index))
            .collect::<Result<Vec<_>, _>>()?;

        let size = match rows.first() {
            Some(first) => first.len(),
            None => return Err(MatrixError::MalformedInput("empty input".to_string())),
        };
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(MatrixError::MalformedInput(format!(
                "row {index} has {} values, the first row has {size}",
                row.len()
            )));
        }
        if rows.len() != size {
            return Err(MatrixError::MalformedInput(format!(
                "{} rows of {size} values do not form a square matrix",
                rows.len()
            )));
        }
        Self::from_rows(rows)
    }

    /// Render one line per row, values separated by a single space.
    ///
    /// ```
    /// let m: sqmat::Matrix = "1 2;3 4".parse().unwrap();
    /// assert_eq!(m.encode(), "1 2\n3 4\n");
    /// ```
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Return a YAML representation: a sequence of rows.
    ///
    /// # Error
    ///
    /// Will return an error if `serde_yaml::to_string`
    /// returns an error.
    pub fn as_yaml_string(&self) -> Result<String, MatrixError> {
        match serde_yaml::to_string(self) {
            Ok(string) => Ok(string),
            Err(e) => Err(e.into()),
        }
    }

    /// Return a JSON representation: an array of rows.
    ///
    /// # Error
    ///
    /// Will return an error if `serde_json::to_string`
    /// returns an error.
    #[cfg(feature = "json")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "json")))]
    pub fn as_json_string(&self) -> Result<String, MatrixError> {
        match serde_json::to_string(self) {
            Ok(string) => Ok(string),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::str::FromStr for Matrix {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let mut values = row.iter();
            if let Some(first) = values.next() {
                write!(f, "{first}")?;
            }
            for value in values {
                write!(f, " {value}")?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// Build a [`Matrix`] from the one-line text encoding.
///
/// See [`Matrix::decode`].
pub fn loads(text: &str) -> Result<Matrix, MatrixError> {
    Matrix::decode(text)
}

/// Build a [`Matrix`] from a YAML sequence of rows.
///
/// ```
/// let m = sqmat::loads_yaml("[[1, 2], [3, 4]]").unwrap();
/// assert_eq!(m.encode(), "1 2\n3 4\n");
/// assert!(sqmat::loads_yaml("[[1, 2], [3]]").is_err());
/// ```
pub fn loads_yaml(yaml: &str) -> Result<Matrix, MatrixError> {
    let matrix: Matrix = serde_yaml::from_str(yaml)?;
    Ok(matrix)
}

/// Build a [`Matrix`] from a type implementing [`Read`]
/// containing YAML.
pub fn load_yaml<T: Read>(reader: T) -> Result<Matrix, MatrixError> {
    let matrix: Matrix = serde_yaml::from_reader(reader)?;
    Ok(matrix)
}

/// Build a [`Matrix`] from a JSON array of rows.
#[cfg(feature = "json")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "json")))]
pub fn loads_json(json: &str) -> Result<Matrix, MatrixError> {
    let matrix: Matrix = serde_json::from_str(json)?;
    Ok(matrix)
}

/// Build a [`Matrix`] from a type implementing [`Read`]
/// containing JSON.
#[cfg(feature = "json")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "json")))]
pub fn load_json<T: Read>(reader: T) -> Result<Matrix, MatrixError> {
    let matrix: Matrix = serde_json::from_reader(reader)?;
    Ok(matrix)
}

#[cfg(test)]
mod codec_tests {
    use super::*;

    #[test]
    fn decode_2x2() {
        let m = Matrix::decode("1 2;3 4").unwrap();
        assert_eq!(m.to_rows(), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(m.encode(), "1 2\n3 4\n");
        assert_eq!(format!("{m}"), "1 2\n3 4\n");
    }

    #[test]
    fn decode_tolerates_tokenizer_whitespace() {
        let m = Matrix::decode("  -1   2 ; 3 +4;\n").unwrap();
        assert_eq!(m.to_rows(), vec![vec![-1, 2], vec![3, 4]]);
    }

    #[test]
    fn decode_errors() {
        for input in [
            "",
            "   ",
            ";",
            "1 2;3",
            "1 2;3 4 5",
            "1 2;3 x",
            "1 2",
            "1 2;3 4;5 6",
            "1;2",
            "99999999999",
            "1.5",
        ] {
            assert!(
                matches!(Matrix::decode(input), Err(MatrixError::MalformedInput(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn round_trip_extremes() {
        let m = Matrix::from_rows(vec![
            vec![Element::MIN, 0, Element::MAX],
            vec![-1, 1, -10],
            vec![123456789, -987654321, 7],
        ])
        .unwrap();
        let text = m.encode().replace('\n', ";");
        assert_eq!(Matrix::decode(&text).unwrap(), m);
    }

    #[test]
    fn encode_large_matrix() {
        // larger than any fixed-size output buffer
        let m = Matrix::from_fn(64, |_, _| Element::MIN).unwrap();
        let text = m.encode();
        assert_eq!(text.lines().count(), 64);
        assert_eq!(text.len(), 64 * (64 * 11 + 63 + 1));
    }

    #[test]
    fn yaml_round_trip() {
        let m = Matrix::decode("1 -2;3 4").unwrap();
        let yaml = m.as_yaml_string().unwrap();
        assert_eq!(loads_yaml(&yaml).unwrap(), m);
        assert_eq!(load_yaml(yaml.as_bytes()).unwrap(), m);
    }

    #[test]
    fn yaml_rejects_invalid_shapes() {
        for input in ["[]", "[[1, 2]]", "[[1], [2, 3]]", "not a matrix"] {
            assert!(
                matches!(loads_yaml(input), Err(MatrixError::YamlError(_))),
                "{input:?}"
            );
        }
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_round_trip() {
        let m = Matrix::decode("5 6;7 8").unwrap();
        let json = m.as_json_string().unwrap();
        assert_eq!(json, "[[5,6],[7,8]]");
        assert_eq!(loads_json(&json).unwrap(), m);
        assert_eq!(load_json(json.as_bytes()).unwrap(), m);
        assert!(loads_json("[[1,2],[3]]").is_err());
    }
}
