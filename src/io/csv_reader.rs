use std::path::Path;

use csv_async::AsyncReaderBuilder;
use futures::StreamExt;
use futures::io::AsyncRead;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, warn};

use super::error::IoError;
use crate::engine::PipelineError;
use crate::step::Arg;
use crate::streaming::{Input, PipelineOptions};

/// Decode a whole CSV document (with header row) into a finite input
pub fn read_csv<T, R>(reader: R) -> Result<Input<T>, IoError>
where
    T: Arg + DeserializeOwned,
    R: std::io::Read,
{
    let records = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()?;
    debug!(records = records.len(), "Read CSV input");
    Ok(Input::Items(records))
}

/// Decode CSV rows on a background task, feeding a queue input
///
/// Rows that fail to decode are reported to the options' error handler and
/// skipped. The task stops at end of input, on cancellation, or when the
/// queue's receiver is dropped. Must be called within a tokio runtime.
pub fn csv_queue<T, R>(reader: R, options: &PipelineOptions) -> Input<T>
where
    T: Arg + DeserializeOwned,
    R: AsyncRead + Unpin + Send + 'static,
{
    spawn_csv_queue(reader, options, true)
}

/// Like [`csv_queue`], for documents without a header row
///
/// Every row is data; fields map onto `T` by position.
pub fn csv_queue_without_headers<T, R>(reader: R, options: &PipelineOptions) -> Input<T>
where
    T: Arg + DeserializeOwned,
    R: AsyncRead + Unpin + Send + 'static,
{
    spawn_csv_queue(reader, options, false)
}

fn spawn_csv_queue<T, R>(reader: R, options: &PipelineOptions, has_headers: bool) -> Input<T>
where
    T: Arg + DeserializeOwned,
    R: AsyncRead + Unpin + Send + 'static,
{
    let (sender, input) = Input::channel(options.channel_capacity());
    let options = options.clone();

    tokio::spawn(async move {
        let cancel = options.cancellation().clone();
        let mut records = Box::pin(
            AsyncReaderBuilder::new()
                .has_headers(has_headers)
                .trim(csv_async::Trim::All)
                .flexible(true)
                .create_deserializer(reader)
                .into_deserialize::<T>(),
        );

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("CSV reader cancelled");
                    break;
                }
                next = records.next() => next,
            };
            let record = match next {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    let fatal = matches!(e.kind(), csv_async::ErrorKind::Io(_));
                    warn!(error = %e, fatal, "Failed to decode CSV row");
                    options.report(PipelineError::Input(IoError::from(e)));
                    if fatal {
                        break;
                    }
                    continue;
                }
                None => break,
            };
            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = sender.send(record) => {
                    if sent.is_err() {
                        debug!("CSV queue receiver dropped");
                        break;
                    }
                }
            }
        }
    });

    input
}

/// Open `path` and stream its CSV rows into a queue input
pub async fn csv_queue_from_file<T>(
    path: impl AsRef<Path>,
    options: &PipelineOptions,
) -> Result<Input<T>, IoError>
where
    T: Arg + DeserializeOwned,
{
    let file = File::open(path.as_ref()).await?;
    Ok(csv_queue(file.compat(), options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::map;
    use crate::step::Steps;
    use crate::streaming::{CollectErrors, Pipeline};
    use futures::io::Cursor;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Row {
        key: String,
        value: i64,
    }

    crate::custom_arg!(Row);

    #[test]
    fn reads_finite_csv() {
        let data = "key,value\na, 1\nb,2\n";
        let input = read_csv::<Row, _>(data.as_bytes()).unwrap();
        let mut p = Pipeline::new(input, Steps::new().then(map(|r: Row| r.value)));
        assert_eq!(p.collect::<i64>(), vec![1, 2]);
    }

    #[test]
    fn finite_csv_reports_bad_rows() {
        let data = "key,value\na,not-a-number\n";
        assert!(matches!(
            read_csv::<Row, _>(data.as_bytes()),
            Err(IoError::Csv(_))
        ));
    }

    #[tokio::test]
    async fn streams_csv_into_queue() {
        let data = "key,value\na,1\nb,2\nc,3\n";
        let options = PipelineOptions::new();
        let input = csv_queue::<Row, _>(Cursor::new(data.as_bytes().to_vec()), &options);

        let mut p = Pipeline::new(input, Steps::new().then(map(|r: Row| r.key)))
            .with_options(options);
        let keys: Vec<_> = p.stream().collect().await;
        let keys: Vec<String> = keys.into_iter().map(|v| v.get().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn streams_headerless_csv_by_position() {
        let data = "a,1\nb, 2\n";
        let options = PipelineOptions::new();
        let input =
            csv_queue_without_headers::<Row, _>(Cursor::new(data.as_bytes().to_vec()), &options);

        let mut p = Pipeline::new(input, Steps::new()).with_options(options);
        let rows: Vec<_> = p.stream().collect().await;
        let rows: Vec<Row> = rows.into_iter().map(|v| v.get().unwrap()).collect();
        assert_eq!(
            rows,
            vec![
                Row {
                    key: "a".to_string(),
                    value: 1
                },
                Row {
                    key: "b".to_string(),
                    value: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn streaming_skips_bad_rows() {
        let data = "key,value\na,1\nb,oops\nc,3\n";
        let errors = CollectErrors::new();
        let options = PipelineOptions::new().with_error_handler(errors.clone());
        let input = csv_queue::<Row, _>(Cursor::new(data.as_bytes().to_vec()), &options);

        let mut p = Pipeline::new(input, Steps::new().then(map(|r: Row| r.value)))
            .with_options(options);
        let values: Vec<_> = p.stream().collect().await;
        assert_eq!(values.len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn opens_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key,value").unwrap();
        writeln!(file, "x,10").unwrap();
        file.flush().unwrap();

        let options = PipelineOptions::new();
        let input = csv_queue_from_file::<Row>(file.path(), &options).await.unwrap();
        let mut p = Pipeline::new(input, Steps::new()).with_options(options);
        let rows: Vec<_> = p.stream().collect().await;
        let row: Row = rows[0].clone().get().unwrap();
        assert_eq!(
            row,
            Row {
                key: "x".to_string(),
                value: 10
            }
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let options = PipelineOptions::new();
        let result = csv_queue_from_file::<Row>("/nonexistent/input.csv", &options).await;
        assert!(matches!(result, Err(IoError::Io(_))));
    }
}
