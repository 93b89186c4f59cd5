//! Flagged ordinals to audio redaction intervals

use tracing::debug;
use veil_core::{Error, RedactionInterval, Result, Token};

use crate::matcher::MatchSpan;

/// Group strictly increasing ordinals into maximal runs of consecutive values
pub fn contiguous_runs(ordinals: &[usize]) -> Result<Vec<MatchSpan>> {
    let mut runs = Vec::new();
    let mut iter = ordinals.iter().copied();

    let Some(first) = iter.next() else {
        return Ok(runs);
    };
    let mut run = MatchSpan {
        start: first,
        end: first,
    };

    for ordinal in iter {
        if ordinal <= run.end {
            return Err(Error::Precondition(format!(
                "ordinals must be strictly increasing: {} follows {}",
                ordinal, run.end
            )));
        }

        if ordinal == run.end + 1 {
            run.end = ordinal;
        } else {
            runs.push(run);
            run = MatchSpan {
                start: ordinal,
                end: ordinal,
            };
        }
    }
    runs.push(run);

    Ok(runs)
}

/// Map each run of flagged ordinals to `(first.start, last.end)`
pub fn merge_intervals(ordinals: &[usize], tokens: &[Token]) -> Result<Vec<RedactionInterval>> {
    let runs = contiguous_runs(ordinals)?;

    let token_at = |ordinal: usize| {
        tokens.get(ordinal).ok_or_else(|| {
            Error::Precondition(format!(
                "ordinal {} out of range for {} token(s)",
                ordinal,
                tokens.len()
            ))
        })
    };

    let intervals = runs
        .iter()
        .map(|run| {
            Ok(RedactionInterval {
                start: token_at(run.start)?.start,
                end: token_at(run.end)?.end,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        flagged = ordinals.len(),
        intervals = intervals.len(),
        "merged redaction intervals"
    );
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::{TimedWord, Transcript};

    fn transcript(times: &[(f64, f64)]) -> Transcript {
        Transcript::from_words(
            times
                .iter()
                .enumerate()
                .map(|(i, &(start, end))| TimedWord {
                    word: format!("w{}", i),
                    start,
                    end,
                })
                .collect(),
        )
    }

    #[test]
    fn test_runs_map_to_token_times() {
        let transcript = transcript(&[
            (0.0, 0.8),
            (1.0, 1.5),
            (1.5, 2.0),
            (2.2, 3.9),
            (4.0, 4.4),
        ]);

        let intervals = merge_intervals(&[1, 2, 4], transcript.tokens()).unwrap();

        assert_eq!(
            intervals,
            vec![
                RedactionInterval {
                    start: 1.0,
                    end: 2.0
                },
                RedactionInterval {
                    start: 4.0,
                    end: 4.4
                },
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_intervals(&[], &[]).unwrap().is_empty());
        assert!(contiguous_runs(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_single_run() {
        let runs = contiguous_runs(&[3, 4, 5]).unwrap();
        assert_eq!(runs, vec![MatchSpan { start: 3, end: 5 }]);
    }

    #[test]
    fn test_isolated_ordinals() {
        let runs = contiguous_runs(&[0, 2, 4]).unwrap();
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.start == r.end));
    }

    #[test]
    fn test_non_monotonic_input_is_precondition_error() {
        assert!(matches!(
            contiguous_runs(&[2, 1]),
            Err(Error::Precondition(_))
        ));
        assert!(matches!(
            contiguous_runs(&[1, 1]),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn test_ordinal_out_of_range() {
        let transcript = transcript(&[(0.0, 1.0)]);
        let result = merge_intervals(&[0, 1], transcript.tokens());
        assert!(matches!(result, Err(Error::Precondition(_))));
    }
}
