// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Coefficient variant constructors.
//!
//! This is where the keyword→variant table from the grammar meets the
//! typed model: each [`CoeffKeyword`] accepts specific payload shapes, and
//! the piecewise families enforce their range invariants at construction.
//! A failed construction never drops data — the resolver demotes the
//! record to [`Coefficient::Opaque`] with a diagnostic.

use thiserror::Error;

use crate::ast::{CoeffKeyword, ParamTail, PolyPiece, Sexp};
use crate::material::Coefficient;

/// Why a parameter payload could not be typed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoefficientError {
    /// A fixed-arity model got the wrong number of coefficients.
    #[error("'{keyword}' expects {expected} coefficients, found {found}")]
    Arity {
        /// The coefficient keyword.
        keyword: CoeffKeyword,
        /// The expected coefficient count.
        expected: usize,
        /// The count found in the source.
        found: usize,
    },

    /// A variable-arity model got zero coefficients.
    #[error("'{0}' expects at least one coefficient")]
    Empty(CoeffKeyword),

    /// Fewer than two piecewise-linear breakpoints.
    #[error("piecewise-linear expects at least two breakpoints")]
    TooFewPoints,

    /// Breakpoint temperatures out of order.
    #[error("temperature breakpoints must be strictly increasing")]
    NonMonotonicPoints,

    /// Temperature ranges unsorted, inverted, or overlapping.
    #[error("temperature ranges must be ascending and non-overlapping")]
    BadRanges,

    /// A piecewise-polynomial piece without two temperatures and at least
    /// one coefficient.
    #[error("each piecewise-polynomial piece expects two temperatures and coefficients")]
    ShortPiece,

    /// A NASA-9 piece without exactly two temperatures and nine
    /// coefficients.
    #[error("each nasa-9 piece expects two temperatures and nine coefficients")]
    BadNasa9Piece,

    /// The payload shape matches no alternative for this keyword.
    #[error("'{keyword}' does not accept this payload shape")]
    Shape {
        /// The coefficient keyword.
        keyword: CoeffKeyword,
    },
}

/// Builds a typed coefficient from a keyword and its parameter tail.
pub fn build(keyword: CoeffKeyword, tail: &ParamTail) -> Result<Coefficient, CoefficientError> {
    match (keyword, tail) {
        (CoeffKeyword::Constant, ParamTail::DottedAtom(atom)) => match atom {
            Sexp::Number(n, _) => Ok(Coefficient::Constant(*n)),
            Sexp::Symbol(s, _) | Sexp::Str(s, _) => Ok(Coefficient::StringRef(s.clone())),
            Sexp::Bool(b, _) => Ok(Coefficient::Boolean(*b)),
            _ => Err(CoefficientError::Shape { keyword }),
        },
        (CoeffKeyword::Constant, ParamTail::Numbers(numbers)) => match numbers.as_slice() {
            [value] => Ok(Coefficient::Constant(*value)),
            _ => Err(CoefficientError::Arity {
                keyword,
                expected: 1,
                found: numbers.len(),
            }),
        },

        (CoeffKeyword::Polynomial, ParamTail::Numbers(numbers)) => {
            if numbers.is_empty() {
                Err(CoefficientError::Empty(keyword))
            } else {
                Ok(Coefficient::Polynomial(numbers.clone()))
            }
        }

        (CoeffKeyword::PiecewiseLinear, ParamTail::Pieces(pieces)) => {
            let mut points = Vec::with_capacity(pieces.len());
            for piece in pieces {
                match piece {
                    PolyPiece::Pair(t, v, _) => points.push((*t, *v)),
                    PolyPiece::List(numbers, _) if numbers.len() == 2 => {
                        points.push((numbers[0], numbers[1]));
                    }
                    PolyPiece::List(..) => return Err(CoefficientError::Shape { keyword }),
                }
            }
            if points.len() < 2 {
                return Err(CoefficientError::TooFewPoints);
            }
            if !points.windows(2).all(|w| w[0].0 < w[1].0) {
                return Err(CoefficientError::NonMonotonicPoints);
            }
            Ok(Coefficient::PiecewiseLinear(points))
        }

        (CoeffKeyword::PiecewisePolynomial, ParamTail::Pieces(pieces)) => {
            let mut ranges = Vec::with_capacity(pieces.len());
            let mut coeffs = Vec::with_capacity(pieces.len());
            for piece in pieces {
                let PolyPiece::List(numbers, _) = piece else {
                    return Err(CoefficientError::ShortPiece);
                };
                if numbers.len() < 3 {
                    return Err(CoefficientError::ShortPiece);
                }
                ranges.push((numbers[0], numbers[1]));
                coeffs.push(numbers[2..].to_vec());
            }
            check_ranges(&ranges)?;
            Ok(Coefficient::PiecewisePolynomial { ranges, coeffs })
        }

        (CoeffKeyword::Nasa9Piecewise, ParamTail::Pieces(pieces)) => {
            let mut ranges = Vec::with_capacity(pieces.len());
            let mut coeffs = Vec::with_capacity(pieces.len());
            for piece in pieces {
                let PolyPiece::List(numbers, _) = piece else {
                    return Err(CoefficientError::BadNasa9Piece);
                };
                if numbers.len() != 11 {
                    return Err(CoefficientError::BadNasa9Piece);
                }
                ranges.push((numbers[0], numbers[1]));
                let fit: [f64; 9] = numbers[2..]
                    .try_into()
                    .map_err(|_| CoefficientError::BadNasa9Piece)?;
                coeffs.push(fit);
            }
            check_ranges(&ranges)?;
            Ok(Coefficient::Nasa9Piecewise { ranges, coeffs })
        }

        (CoeffKeyword::Sutherland, ParamTail::Numbers(numbers)) => {
            fixed_arity::<3>(keyword, numbers).map(Coefficient::Sutherland)
        }
        (CoeffKeyword::Blottner, ParamTail::Numbers(numbers)) => {
            fixed_arity::<3>(keyword, numbers).map(Coefficient::Blottner)
        }

        (CoeffKeyword::CompressibleLiquid, ParamTail::Numbers(numbers)) => {
            if numbers.is_empty() {
                Err(CoefficientError::Empty(keyword))
            } else {
                Ok(Coefficient::CompressibleLiquid(numbers.clone()))
            }
        }
        (CoeffKeyword::PowerLaw, ParamTail::Numbers(numbers)) => {
            if numbers.is_empty() {
                Err(CoefficientError::Empty(keyword))
            } else {
                Ok(Coefficient::PowerLaw(numbers.clone()))
            }
        }

        (keyword, _) => Err(CoefficientError::Shape { keyword }),
    }
}

/// Converts a flat number list into a fixed-size coefficient tuple.
fn fixed_arity<const N: usize>(
    keyword: CoeffKeyword,
    numbers: &[f64],
) -> Result<[f64; N], CoefficientError> {
    numbers.try_into().map_err(|_| CoefficientError::Arity {
        keyword,
        expected: N,
        found: numbers.len(),
    })
}

/// Checks that ranges are internally ordered, ascending, and
/// non-overlapping. Adjacent ranges may share an endpoint, as NASA-9
/// segments conventionally do.
fn check_ranges(ranges: &[(f64, f64)]) -> Result<(), CoefficientError> {
    if ranges.iter().any(|(low, high)| low >= high) {
        return Err(CoefficientError::BadRanges);
    }
    if !ranges.windows(2).all(|w| w[0].1 <= w[1].0) {
        return Err(CoefficientError::BadRanges);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::Span;

    fn pair(t: f64, v: f64) -> PolyPiece {
        PolyPiece::Pair(t, v, Span::default())
    }

    fn list(numbers: &[f64]) -> PolyPiece {
        PolyPiece::List(numbers.to_vec(), Span::default())
    }

    #[test]
    fn constant_from_dotted_number() {
        let tail = ParamTail::DottedAtom(Sexp::Number(1.225, Span::default()));
        assert_eq!(
            build(CoeffKeyword::Constant, &tail),
            Ok(Coefficient::Constant(1.225))
        );
    }

    #[test]
    fn constant_from_dotted_symbol_is_string_ref() {
        let tail = ParamTail::DottedAtom(Sexp::Symbol("n2".into(), Span::default()));
        assert_eq!(
            build(CoeffKeyword::Constant, &tail),
            Ok(Coefficient::StringRef("n2".into()))
        );
    }

    #[test]
    fn constant_from_dotted_boolean() {
        let tail = ParamTail::DottedAtom(Sexp::Bool(false, Span::default()));
        assert_eq!(
            build(CoeffKeyword::Constant, &tail),
            Ok(Coefficient::Boolean(false))
        );
    }

    #[test]
    fn constant_accepts_single_number_list() {
        assert_eq!(
            build(CoeffKeyword::Constant, &ParamTail::Numbers(vec![840.0])),
            Ok(Coefficient::Constant(840.0))
        );
        assert!(matches!(
            build(CoeffKeyword::Constant, &ParamTail::Numbers(vec![1.0, 2.0])),
            Err(CoefficientError::Arity { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn polynomial_requires_coefficients() {
        assert_eq!(
            build(
                CoeffKeyword::Polynomial,
                &ParamTail::Numbers(vec![429.929, 1.874])
            ),
            Ok(Coefficient::Polynomial(vec![429.929, 1.874]))
        );
        assert_eq!(
            build(CoeffKeyword::Polynomial, &ParamTail::Numbers(Vec::new())),
            Err(CoefficientError::Empty(CoeffKeyword::Polynomial))
        );
    }

    #[test]
    fn piecewise_linear_from_pairs() {
        let tail = ParamTail::Pieces(vec![pair(300.0, 1005.0), pair(1000.0, 1142.0)]);
        assert_eq!(
            build(CoeffKeyword::PiecewiseLinear, &tail),
            Ok(Coefficient::PiecewiseLinear(vec![
                (300.0, 1005.0),
                (1000.0, 1142.0)
            ]))
        );
    }

    #[test]
    fn piecewise_linear_accepts_two_element_lists() {
        let tail = ParamTail::Pieces(vec![list(&[300.0, 1005.0]), list(&[1000.0, 1142.0])]);
        assert!(build(CoeffKeyword::PiecewiseLinear, &tail).is_ok());
    }

    #[test]
    fn piecewise_linear_enforces_monotonicity() {
        let tail = ParamTail::Pieces(vec![pair(1000.0, 1142.0), pair(300.0, 1005.0)]);
        assert_eq!(
            build(CoeffKeyword::PiecewiseLinear, &tail),
            Err(CoefficientError::NonMonotonicPoints)
        );
    }

    #[test]
    fn piecewise_linear_needs_two_points() {
        let tail = ParamTail::Pieces(vec![pair(300.0, 1005.0)]);
        assert_eq!(
            build(CoeffKeyword::PiecewiseLinear, &tail),
            Err(CoefficientError::TooFewPoints)
        );
    }

    #[test]
    fn piecewise_polynomial_splits_ranges_and_coefficients() {
        let tail = ParamTail::Pieces(vec![
            list(&[300.0, 1000.0, 1.0, 2.0]),
            list(&[1000.0, 3000.0, 3.0]),
        ]);
        assert_eq!(
            build(CoeffKeyword::PiecewisePolynomial, &tail),
            Ok(Coefficient::PiecewisePolynomial {
                ranges: vec![(300.0, 1000.0), (1000.0, 3000.0)],
                coeffs: vec![vec![1.0, 2.0], vec![3.0]],
            })
        );
    }

    #[test]
    fn piecewise_polynomial_rejects_overlapping_ranges() {
        let tail = ParamTail::Pieces(vec![
            list(&[300.0, 1200.0, 1.0]),
            list(&[1000.0, 3000.0, 2.0]),
        ]);
        assert_eq!(
            build(CoeffKeyword::PiecewisePolynomial, &tail),
            Err(CoefficientError::BadRanges)
        );
    }

    #[test]
    fn piecewise_polynomial_rejects_inverted_range() {
        let tail = ParamTail::Pieces(vec![list(&[1000.0, 300.0, 1.0])]);
        assert_eq!(
            build(CoeffKeyword::PiecewisePolynomial, &tail),
            Err(CoefficientError::BadRanges)
        );
    }

    #[test]
    fn nasa9_requires_eleven_numbers_per_piece() {
        let good: Vec<f64> = (0..11).map(f64::from).collect();
        let tail = ParamTail::Pieces(vec![list(&good)]);
        let built = build(CoeffKeyword::Nasa9Piecewise, &tail).unwrap();
        let Coefficient::Nasa9Piecewise { ranges, coeffs } = built else {
            panic!("expected nasa-9");
        };
        assert_eq!(ranges, vec![(0.0, 1.0)]);
        assert_eq!(coeffs[0], [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);

        let short: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(
            build(CoeffKeyword::Nasa9Piecewise, &ParamTail::Pieces(vec![list(&short)])),
            Err(CoefficientError::BadNasa9Piece)
        );
    }

    #[test]
    fn nasa9_segments_may_share_endpoints() {
        let a: Vec<f64> = [200.0, 1000.0].iter().chain(&[1.0; 9]).copied().collect();
        let b: Vec<f64> = [1000.0, 6000.0].iter().chain(&[2.0; 9]).copied().collect();
        let tail = ParamTail::Pieces(vec![list(&a), list(&b)]);
        assert!(build(CoeffKeyword::Nasa9Piecewise, &tail).is_ok());
    }

    #[test]
    fn sutherland_and_blottner_are_three_coefficient_models() {
        assert_eq!(
            build(
                CoeffKeyword::Sutherland,
                &ParamTail::Numbers(vec![1.716e-5, 273.15, 110.4])
            ),
            Ok(Coefficient::Sutherland([1.716e-5, 273.15, 110.4]))
        );
        assert!(matches!(
            build(CoeffKeyword::Sutherland, &ParamTail::Numbers(vec![1.0])),
            Err(CoefficientError::Arity { expected: 3, found: 1, .. })
        ));
        assert!(matches!(
            build(
                CoeffKeyword::Blottner,
                &ParamTail::Numbers(vec![1.0, 2.0, 3.0, 4.0])
            ),
            Err(CoefficientError::Arity { expected: 3, found: 4, .. })
        ));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        // Pieces under a flat-list keyword.
        let tail = ParamTail::Pieces(vec![pair(1.0, 2.0)]);
        assert!(matches!(
            build(CoeffKeyword::Sutherland, &tail),
            Err(CoefficientError::Shape { .. })
        ));
        // Numbers under a piecewise keyword.
        assert!(matches!(
            build(CoeffKeyword::PiecewiseLinear, &ParamTail::Numbers(vec![1.0, 2.0])),
            Err(CoefficientError::Shape { .. })
        ));
    }
}
