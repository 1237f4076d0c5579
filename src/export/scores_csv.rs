//! CSV export of per-policy scores
//!
//! One row per policy: its index, its first-step action on every factor, the
//! posterior probability, the negative expected free energy and each term
//! that went into it.

use std::{fs::File, io::Write, path::Path};

use ndarray::ArrayView1;

use crate::{Error, Result, control::EfeBreakdown, policies::PolicyBatch};

/// A single row in the scores CSV export
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub policy: usize,
    pub first_action: Vec<usize>,
    pub q_pi: f64,
    pub neg_efe: f64,
    pub breakdown: EfeBreakdown,
}

/// Exporter for policy score CSV files
pub struct ScoresCsvExporter;

impl ScoresCsvExporter {
    /// Pair every policy with its posterior mass, score and decomposition.
    pub fn collect(
        policies: &PolicyBatch,
        q_pi: ArrayView1<'_, f64>,
        neg_efe: ArrayView1<'_, f64>,
        breakdowns: &[EfeBreakdown],
    ) -> Result<Vec<ScoreRecord>> {
        let n = policies.len();
        if q_pi.len() != n || neg_efe.len() != n || breakdowns.len() != n {
            return Err(Error::shape(
                "exported score columns",
                n,
                (q_pi.len(), neg_efe.len(), breakdowns.len()),
            ));
        }
        Ok((0..n)
            .map(|idx| ScoreRecord {
                policy: idx,
                first_action: policies.first_action(idx),
                q_pi: q_pi[idx],
                neg_efe: neg_efe[idx],
                breakdown: breakdowns[idx],
            })
            .collect())
    }

    /// Column names for a batch over `num_factors` factors.
    pub fn header(num_factors: usize) -> Vec<String> {
        let mut header = vec!["policy".to_string()];
        header.extend((0..num_factors).map(|f| format!("action_f{f}")));
        header.extend(
            [
                "q_pi",
                "neg_efe",
                "utility",
                "states_info_gain",
                "param_info_gain",
                "inductive_value",
            ]
            .map(String::from),
        );
        header
    }

    /// Write `records` as CSV to any writer.
    pub fn write<W: Write>(writer: W, num_factors: usize, records: &[ScoreRecord]) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(Self::header(num_factors))?;
        for record in records {
            if record.first_action.len() != num_factors {
                return Err(Error::shape(
                    format!("first action of policy {}", record.policy),
                    num_factors,
                    record.first_action.len(),
                ));
            }
            let mut row = vec![record.policy.to_string()];
            row.extend(record.first_action.iter().map(ToString::to_string));
            let b = &record.breakdown;
            row.extend(
                [
                    record.q_pi,
                    record.neg_efe,
                    b.utility,
                    b.states_info_gain,
                    b.param_info_gain,
                    b.inductive_value,
                ]
                .map(|v| v.to_string()),
            );
            csv.write_record(&row)?;
        }
        csv.flush().map_err(|source| Error::Io {
            operation: "flush scores CSV".to_string(),
            source,
        })?;
        Ok(())
    }

    /// Write the scores of `policies` to the CSV file at `path`.
    ///
    /// # Returns
    /// Number of policies exported
    pub fn export(
        path: &Path,
        policies: &PolicyBatch,
        q_pi: ArrayView1<'_, f64>,
        neg_efe: ArrayView1<'_, f64>,
        breakdowns: &[EfeBreakdown],
    ) -> Result<usize> {
        let records = Self::collect(policies, q_pi, neg_efe, breakdowns)?;
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        Self::write(file, policies.num_factors(), &records)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::policies::construct_policies;

    #[test]
    fn writes_header_and_one_row_per_policy() {
        let policies = construct_policies(&[2, 2], None, 1, None).unwrap();
        let q_pi = array![0.1, 0.2, 0.3, 0.4];
        let neg_efe = array![-1.0, -0.5, 0.0, 0.5];
        let breakdowns: Vec<EfeBreakdown> = neg_efe
            .iter()
            .map(|&v| EfeBreakdown {
                utility: v,
                ..EfeBreakdown::default()
            })
            .collect();
        let records =
            ScoresCsvExporter::collect(&policies, q_pi.view(), neg_efe.view(), &breakdowns).unwrap();

        let mut buf = Vec::new();
        ScoresCsvExporter::write(&mut buf, 2, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "policy,action_f0,action_f1,q_pi,neg_efe,utility,states_info_gain,param_info_gain,inductive_value"
        );
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("2,1,0,0.3,0,0,"));
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let policies = construct_policies(&[2], None, 1, None).unwrap();
        let q_pi = array![1.0];
        let neg_efe = array![0.0, 0.0];
        let err = ScoresCsvExporter::collect(&policies, q_pi.view(), neg_efe.view(), &[])
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
