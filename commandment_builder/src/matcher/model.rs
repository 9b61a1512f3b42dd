use thiserror::Error;

use crate::matcher::{Bound, PositionValue};
use crate::model::Position;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MatchTokens {
    pub name: String,
    /// Where the parameter itself was matched.
    pub position: Position,
    pub values: Vec<PositionValue>,
}

impl MatchTokens {
    pub(crate) fn raw(&self) -> Vec<&str> {
        self.values.iter().map(|(_, value)| value.as_str()).collect()
    }

    /// The position of the first value, or the parameter itself when it has none.
    pub(crate) fn first_position(&self) -> Position {
        self.values
            .first()
            .map(|(position, _)| *position)
            .unwrap_or(self.position)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CloseError {
    #[error("too few values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooFewValues {
        name: String,
        provided: usize,
        expected: u8,
    },

    #[error("too many values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooManyValues {
        name: String,
        provided: usize,
        expected: u8,
    },
}

#[derive(Debug)]
pub(crate) struct MatchBuffer {
    name: String,
    bound: Bound,
    position: Position,
    values: Vec<PositionValue>,
}

impl MatchBuffer {
    pub(crate) fn new(name: impl Into<String>, bound: Bound, position: Position) -> Self {
        Self {
            name: name.into(),
            bound,
            position,
            values: Vec::default(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn push(&mut self, position: Position, value: String) {
        self.values.push((position, value));
    }

    pub(crate) fn is_open(&self) -> bool {
        match self.bound {
            Bound::Range(_, n) => self.values.len() < n as usize,
            Bound::Lower(_) => true,
        }
    }

    pub(crate) fn can_close(&self) -> bool {
        self.values.len() >= self.bound.min() as usize
    }

    pub(crate) fn close(self) -> Result<MatchTokens, CloseError> {
        if self.values.len() < self.bound.min() as usize {
            return Err(CloseError::TooFewValues {
                name: self.name,
                provided: self.values.len(),
                expected: self.bound.min(),
            });
        }

        if let Some(max) = self.bound.max() {
            if self.values.len() > max as usize {
                return Err(CloseError::TooManyValues {
                    name: self.name,
                    provided: self.values.len(),
                    expected: max,
                });
            }
        }

        Ok(MatchTokens {
            name: self.name,
            position: self.position,
            values: self.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    fn random_values(feed: u8) -> Vec<PositionValue> {
        (0..feed)
            .map(|i| (Position::at(thread_rng().gen()), i.to_string()))
            .collect()
    }

    #[rstest]
    #[case(Bound::Lower(0), 0, true)]
    #[case(Bound::Lower(0), 1, true)]
    #[case(Bound::Lower(1), 0, false)]
    #[case(Bound::Lower(1), 1, true)]
    #[case(Bound::Lower(1), 2, true)]
    #[case(Bound::Lower(10), 2, false)]
    #[case(Bound::Range(0, 2), 0, true)]
    #[case(Bound::Range(0, 2), 1, true)]
    #[case(Bound::Range(1, 2), 0, false)]
    #[case(Bound::Range(1, 2), 1, true)]
    #[case(Bound::Range(1, 2), 2, true)]
    #[case(Bound::Range(10, 20), 2, false)]
    fn match_buffer_lower(#[case] bound: Bound, #[case] feed: u8, #[case] expected_ok: bool) {
        let name = "name";
        let remains_open = match bound.max() {
            Some(upper) => upper > feed,
            None => true,
        };
        let mut mb = MatchBuffer::new(name, bound, Position::at(0));
        assert!(mb.is_open());
        let values = random_values(feed);

        for (position, value) in &values {
            mb.push(*position, value.clone());
        }

        assert_eq!(mb.is_open(), remains_open);

        if expected_ok {
            assert!(mb.can_close());
            assert_eq!(
                mb.close().unwrap(),
                MatchTokens {
                    name: name.to_string(),
                    position: Position::at(0),
                    values,
                }
            );
        } else {
            assert!(!mb.can_close());
            assert_eq!(
                mb.close().unwrap_err(),
                CloseError::TooFewValues {
                    name: name.to_string(),
                    provided: feed as usize,
                    expected: bound.min(),
                }
            );
        }
    }

    #[rstest]
    #[case(Bound::Range(0, 0), 0, true)]
    #[case(Bound::Range(0, 0), 1, false)]
    #[case(Bound::Range(0, 1), 0, true)]
    #[case(Bound::Range(0, 1), 1, true)]
    #[case(Bound::Range(0, 1), 2, false)]
    #[case(Bound::Range(0, 10), 20, false)]
    fn match_buffer_upper(#[case] bound: Bound, #[case] feed: u8, #[case] expected_ok: bool) {
        let name = "name";
        let upper = bound.max().expect("un-planned test case");
        let mut mb = MatchBuffer::new(name, bound, Position::at(3));
        assert_eq!(mb.is_open(), upper > 0);

        for (position, value) in random_values(feed) {
            mb.push(position, value);
        }

        assert!(mb.can_close());

        if expected_ok {
            assert_eq!(mb.is_open(), upper > feed);
            assert_eq!(mb.close().unwrap().values.len(), feed as usize);
        } else {
            assert_eq!(
                mb.close().unwrap_err(),
                CloseError::TooManyValues {
                    name: name.to_string(),
                    provided: feed as usize,
                    expected: upper,
                }
            );
        }
    }

    #[test]
    fn random_bounds_close() {
        for _ in 0..100 {
            let bound: Bound = thread_rng().gen();
            let mut mb = MatchBuffer::new("name", bound, Position::at(0));

            for (position, value) in random_values(bound.min()) {
                mb.push(position, value);
            }

            assert!(mb.can_close());
            assert_eq!(mb.close().unwrap().values.len(), bound.min() as usize);
        }
    }

    #[test]
    fn first_position() {
        let empty = MatchTokens {
            name: "flag".to_string(),
            position: Position::new(1, 2),
            values: vec![],
        };
        assert_eq!(empty.first_position(), Position::new(1, 2));

        let full = MatchTokens {
            name: "item".to_string(),
            position: Position::new(1, 2),
            values: vec![(Position::new(2, 0), "a".to_string())],
        };
        assert_eq!(full.first_position(), Position::new(2, 0));
        assert_eq!(full.raw(), vec!["a"]);
    }
}
