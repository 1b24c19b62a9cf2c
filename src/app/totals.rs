use futures::StreamExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::error::AppError;
use crate::aggregate::group_by;
use crate::engine::PipelineError;
use crate::io::IoError;
use crate::ops::filter;
use crate::step::Steps;
use crate::streaming::{Input, Pipeline, PipelineOptions};

/// One `key,value` input row
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Row {
    pub key: String,
    pub value: f64,
}

crate::custom_arg!(Row);

/// Per-key summary written by the CLI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyTotal {
    pub key: String,
    pub count: usize,
    pub total: f64,
}

fn totals_steps() -> Steps {
    Steps::new()
        .then(filter(|row: &Row| row.value.is_finite()))
        .aggregate(group_by(|row: Row| (row.key, row.value)))
}

/// Group rows by key and total their values, keys in first-seen order
///
/// Fails with `Cancelled` when the options' token fired before the input ended.
pub async fn group_totals(
    input: Input<Row>,
    options: PipelineOptions,
) -> Result<Vec<KeyTotal>, AppError> {
    let cancellation = options.cancellation().clone();
    let mut pipeline = Pipeline::try_new(input, totals_steps())?.with_options(options);

    let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
    {
        let mut stream = std::pin::pin!(pipeline.stream());
        while let Some(value) = stream.next().await {
            groups = value.get()?;
        }
    }
    if cancellation.is_cancelled() {
        return Err(PipelineError::Cancelled.into());
    }

    debug!(keys = groups.len(), "Grouped input rows");
    Ok(groups
        .into_iter()
        .map(|(key, values)| KeyTotal {
            count: values.len(),
            total: values.iter().sum(),
            key,
        })
        .collect())
}

/// Write totals as CSV (with header) and flush
pub async fn write_totals<W>(totals: &[KeyTotal], writer: &mut W) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    for total in totals {
        csv_writer.serialize(total).map_err(IoError::from)?;
    }
    let bytes = csv_writer.into_inner().map_err(|e| e.into_error())?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_csv;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn totals_per_key_in_first_seen_order() {
        let data = "key,value\nb,1.5\na,2\nb,2.5\n";
        let input = read_csv::<Row, _>(data.as_bytes()).unwrap();

        let totals = group_totals(input, PipelineOptions::new()).await.unwrap();
        assert_eq!(
            totals,
            vec![
                KeyTotal {
                    key: "b".to_string(),
                    count: 2,
                    total: 4.0
                },
                KeyTotal {
                    key: "a".to_string(),
                    count: 1,
                    total: 2.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_has_no_totals() {
        let totals = group_totals(Input::items(Vec::new()), PipelineOptions::new())
            .await
            .unwrap();
        assert!(totals.is_empty());
    }

    #[tokio::test]
    async fn cancelled_run_is_an_error() {
        let (_sender, input) = Input::channel(1);
        let token = CancellationToken::new();
        token.cancel();
        let options = PipelineOptions::new().with_cancellation(token);

        let err = group_totals(input, options).await.unwrap_err();
        assert!(matches!(err, AppError::Pipeline(PipelineError::Cancelled)));
    }

    #[tokio::test]
    async fn writes_csv_with_header() {
        let totals = vec![KeyTotal {
            key: "a".to_string(),
            count: 2,
            total: 3.5,
        }];
        let mut out = Vec::new();
        write_totals(&totals, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "key,count,total\na,2,3.5\n");
    }
}
