/*! Implements [`Constraint`], the rules that further restrict the typed values of a
[`Domain`].

[`Domain`]: ../struct.Domain.html
[`Constraint`]: ./enum.Constraint.html
*/
use crate::{Error, Value};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Is a rule restricting values of the type it governs. Values of any other
/// type pass a constraint trivially; e.g. `StringLength` accepts every number.
///
/// **Note**: a [`Domain`] is expected to hold at most one constraint of each kind.
///
/// [`Domain`]: ./struct.Domain.html
#[derive(Clone, PartialEq, Debug)]
pub enum Constraint {
    /// Rejects null.
    NotNull,
    /// Bounds the number of characters of strings (inclusive).
    StringLength { min: usize, max: usize },
    /// Bounds numbers to `[min, max]`.
    Range { min: f64, max: f64 },
    /// Rejects negative numbers and, if `max` is present, numbers above `max`.
    Positive { max: Option<f64> },
}

/// Is the outcome of subtracting an interval from another.
enum Subtracted {
    Unchanged,
    /// The upper part is removed; the result ends where the other interval starts.
    KeepLower,
    /// The lower part is removed; the result starts where the other interval ends.
    KeepUpper,
}

fn subtract<T: PartialOrd>(min1: T, max1: T, min2: T, max2: T) -> Subtracted {
    if max2 < min1 || min2 > max1 {
        return Subtracted::Unchanged;
    }
    match (min2 <= min1, max2 >= max1) {
        (false, true) => Subtracted::KeepLower,
        (true, false) => Subtracted::KeepUpper,
        (true, true) => {
            debug!("difference with an enclosing interval is not simplified; keeping the left operand");
            Subtracted::Unchanged
        }
        (false, false) => {
            debug!("difference of enclosed interval is not representable; keeping the left operand");
            Subtracted::Unchanged
        }
    }
}

// NaN is neither above nor below any bound, so it fails both tests.
fn at_least(value: &Value, bound: f64) -> bool {
    matches!(
        value.cmp_number(bound),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

fn at_most(value: &Value, bound: f64) -> bool {
    matches!(value.cmp_number(bound), Some(Ordering::Less | Ordering::Equal))
}

impl Constraint {
    #[inline(always)]
    pub fn not_null() -> Self {
        Constraint::NotNull
    }

    #[inline(always)]
    pub fn string_length(min: usize, max: usize) -> Self {
        Constraint::StringLength { min, max }
    }

    pub fn range(min: impl Into<f64>, max: impl Into<f64>) -> Self {
        Constraint::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Creates a `Positive` constraint with no upper bound.
    #[inline(always)]
    pub fn positive() -> Self {
        Constraint::Positive { max: None }
    }

    pub fn positive_up_to(max: impl Into<f64>) -> Self {
        Constraint::Positive {
            max: Some(max.into()),
        }
    }

    /// Returns the name of the kind of the receiver.
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::NotNull => "NotNull",
            Constraint::StringLength { .. } => "StringLength",
            Constraint::Range { .. } => "Range",
            Constraint::Positive { .. } => "Positive",
        }
    }

    /// Returns true if the receiver and `other` are of the same kind.
    #[inline(always)]
    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Checks `value` against the receiver and returns the reason of the
    /// violation if it is rejected.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Constraint::NotNull => {
                if value.is_null() {
                    return Err("value cannot be null".to_string());
                }
            }
            Constraint::StringLength { min, max } => {
                if let Some(s) = value.as_str() {
                    let length = s.chars().count();
                    if length < *min || length > *max {
                        return Err(format!(
                            "expected string length in [{}, {}], got {}",
                            min, max, length
                        ));
                    }
                }
            }
            Constraint::Range { min, max } => {
                if value.value_type().is_numeric()
                    && !(at_least(value, *min) && at_most(value, *max))
                {
                    return Err(format!(
                        "expected a value between {} and {}, got {}",
                        min, max, value
                    ));
                }
            }
            Constraint::Positive { max } => {
                if value.value_type().is_numeric() {
                    if !at_least(value, 0.0) {
                        return Err(format!("expected a positive value, got {}", value));
                    }
                    if let Some(max) = max {
                        if !at_most(value, *max) {
                            return Err(format!(
                                "expected a value less than or equal to {}, got {}",
                                max, value
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns true if `value` satisfies the receiver.
    #[inline(always)]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    /// Returns the constraint that accepts what either the receiver or `other` accepts.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::Constraint;
    ///
    /// let wide = Constraint::range(1, 5).union(&Constraint::range(3, 6)).unwrap();
    /// assert_eq!(Constraint::range(1, 6), wide);
    /// ```
    pub fn union(&self, other: &Self) -> Result<Self, Error> {
        match (self, other) {
            (Constraint::NotNull, Constraint::NotNull) => Ok(Constraint::NotNull),
            (
                Constraint::StringLength { min: min1, max: max1 },
                Constraint::StringLength { min: min2, max: max2 },
            ) => Ok(Constraint::StringLength {
                min: *min1.min(min2),
                max: *max1.max(max2),
            }),
            (Constraint::Range { min: min1, max: max1 }, Constraint::Range { min: min2, max: max2 }) => {
                Ok(Constraint::Range {
                    min: min1.min(*min2),
                    max: max1.max(*max2),
                })
            }
            (Constraint::Positive { max: max1 }, Constraint::Positive { max: max2 }) => {
                let max = match (max1, max2) {
                    (Some(a), Some(b)) => Some(a.max(*b)),
                    _ => None,
                };
                Ok(Constraint::Positive { max })
            }
            _ => Err(self.mismatch(other)),
        }
    }

    /// Returns the constraint that accepts what both the receiver and `other` accept.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{Constraint, Error};
    ///
    /// let narrow = Constraint::range(1, 5).intersection(&Constraint::range(3, 6)).unwrap();
    /// assert_eq!(Constraint::range(3, 5), narrow);
    ///
    /// let disjoint = Constraint::range(1, 2).intersection(&Constraint::range(3, 4));
    /// assert!(matches!(disjoint, Err(Error::EmptyRange { .. })));
    /// ```
    pub fn intersection(&self, other: &Self) -> Result<Self, Error> {
        match (self, other) {
            (Constraint::NotNull, Constraint::NotNull) => Ok(Constraint::NotNull),
            (
                Constraint::StringLength { min: min1, max: max1 },
                Constraint::StringLength { min: min2, max: max2 },
            ) => {
                let (min, max) = (*min1.max(min2), *max1.min(max2));
                if min > max {
                    return Err(self.empty("intersection", min, max));
                }
                Ok(Constraint::StringLength { min, max })
            }
            (Constraint::Range { min: min1, max: max1 }, Constraint::Range { min: min2, max: max2 }) => {
                let (min, max) = (min1.max(*min2), max1.min(*max2));
                if min > max {
                    return Err(self.empty("intersection", min, max));
                }
                Ok(Constraint::Range { min, max })
            }
            (Constraint::Positive { max: max1 }, Constraint::Positive { max: max2 }) => {
                let max = match (max1, max2) {
                    (Some(a), Some(b)) => Some(a.min(*b)),
                    (Some(a), None) | (None, Some(a)) => Some(*a),
                    (None, None) => None,
                };
                Ok(Constraint::Positive { max })
            }
            _ => Err(self.mismatch(other)),
        }
    }

    /// Removes the part of the receiver's interval that overlaps with `other`.
    ///
    /// Only a partial overlap is subtracted. In every other case (disjoint intervals,
    /// `other` inside the receiver, `other` covering the receiver, and `Positive`
    /// constraints) the receiver is returned as is, so that relations sharing a
    /// schema can always be subtracted.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::Constraint;
    ///
    /// let rest = Constraint::range(1, 5).difference(&Constraint::range(3, 6)).unwrap();
    /// assert_eq!(Constraint::range(1, 3), rest);
    /// ```
    pub fn difference(&self, other: &Self) -> Result<Self, Error> {
        match (self, other) {
            (Constraint::NotNull, Constraint::NotNull) => Ok(Constraint::NotNull),
            (
                Constraint::StringLength { min: min1, max: max1 },
                Constraint::StringLength { min: min2, max: max2 },
            ) => match subtract(*min1, *max1, *min2, *max2) {
                Subtracted::Unchanged => Ok(self.clone()),
                // `min2 > min1 >= 0` and `max2 < max1`, so neither step overflows:
                Subtracted::KeepLower => Ok(Constraint::StringLength {
                    min: *min1,
                    max: min2 - 1,
                }),
                Subtracted::KeepUpper => Ok(Constraint::StringLength {
                    min: max2 + 1,
                    max: *max1,
                }),
            },
            (Constraint::Range { min: min1, max: max1 }, Constraint::Range { min: min2, max: max2 }) => {
                match subtract(*min1, *max1, *min2, *max2) {
                    Subtracted::Unchanged => Ok(self.clone()),
                    Subtracted::KeepLower => Ok(Constraint::Range {
                        min: *min1,
                        max: *min2,
                    }),
                    Subtracted::KeepUpper => Ok(Constraint::Range {
                        min: *max2,
                        max: *max1,
                    }),
                }
            }
            (Constraint::Positive { .. }, Constraint::Positive { .. }) => {
                debug!("difference of Positive constraints is not simplified; keeping the left operand");
                Ok(self.clone())
            }
            _ => Err(self.mismatch(other)),
        }
    }

    fn mismatch(&self, other: &Self) -> Error {
        Error::ConstraintKindMismatch {
            left: self.kind(),
            right: other.kind(),
        }
    }

    fn empty(&self, operation: &'static str, min: impl ToString, max: impl ToString) -> Error {
        Error::EmptyRange {
            kind: self.kind(),
            operation,
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::NotNull => f.write_str("NotNull"),
            Constraint::StringLength { min, max } => write!(f, "StringLength({}, {})", min, max),
            Constraint::Range { min, max } => write!(f, "Range({}, {})", min, max),
            Constraint::Positive { max: Some(max) } => write!(f, "Positive(max={})", max),
            Constraint::Positive { max: None } => f.write_str("Positive"),
        }
    }
}
