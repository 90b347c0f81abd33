use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use csv::StringRecord;
use encoding_rs::Encoding;

use crate::encoding::{decode_reader, EncodeWriter};
use crate::fetcher::StatusSource;
use crate::logger::Reporter;
use crate::model::error::ProcessorError;
use crate::model::row::{InputRow, OUTPUT_HEADERS};
use crate::transformer::RowTransformer;

/// Runs the transformer over every row of an input CSV, stopping at the
/// first row that cannot be transformed.
pub struct AccountProcessor<S> {
    transformer: RowTransformer<S>,
    reporter: Arc<dyn Reporter>,
}

impl<S: StatusSource> AccountProcessor<S> {
    pub fn new(transformer: RowTransformer<S>, reporter: Arc<dyn Reporter>) -> Self {
        AccountProcessor {
            transformer,
            reporter,
        }
    }

    pub fn process_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        overwrite: bool,
        encoding: &'static Encoding,
    ) -> Result<u64, ProcessorError> {
        if output_path.exists() && !overwrite {
            return Err(ProcessorError::InvalidArguments(
                "Output already exists: either specify a new output filename, or use '--overwrite'"
                    .to_string(),
            ));
        }

        let input = decode_reader(File::open(input_path)?, encoding);
        let mut output = EncodeWriter::new(File::create(output_path)?, encoding);

        let result = self.process(input, &mut output);
        output.finish()?;
        result
    }

    /// Writes the header, then one output record per input record. Output
    /// already written is flushed and kept when a row aborts the run.
    pub fn process<R: Read, W: Write>(&self, input: R, output: W) -> Result<u64, ProcessorError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(input);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);

        writer.write_record(OUTPUT_HEADERS)?;
        let headers = reader.headers()?.clone();

        let mut written = 0;
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let row = InputRow::from_record(&headers, &record);

            match self.transformer.transform(&row) {
                Ok(Some(output_row)) => {
                    writer.serialize(output_row)?;
                    written += 1;
                }
                Ok(None) => {
                    writer.flush()?;
                    let line = record.position().map_or(0, |p| p.line());
                    return Err(ProcessorError::RowRejected { line });
                }
                Err(e) => {
                    writer.flush()?;
                    return Err(e);
                }
            }
        }

        writer.flush()?;
        self.reporter.info(&format!("processed {} rows", written));
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tracing::Level;

    use super::*;
    use crate::logger::MemoryReporter;
    use crate::model::status::StatusRecord;

    struct MapSource(HashMap<&'static str, StatusRecord>);

    impl StatusSource for MapSource {
        fn fetch(&self, account_id: &str) -> Result<Option<StatusRecord>, ProcessorError> {
            Ok(self.0.get(account_id).cloned())
        }
    }

    fn processor() -> (AccountProcessor<MapSource>, Arc<MemoryReporter>) {
        let mut statuses = HashMap::new();
        statuses.insert(
            "12345",
            StatusRecord {
                status: Some("good".to_string()),
                created_on: Some("2011-01-12".to_string()),
            },
        );
        statuses.insert(
            "23456",
            StatusRecord {
                status: Some("closed".to_string()),
                created_on: None,
            },
        );

        let reporter = Arc::new(MemoryReporter::default());
        let transformer = RowTransformer::new(MapSource(statuses), reporter.clone());
        (AccountProcessor::new(transformer, reporter.clone()), reporter)
    }

    fn run(input: &str) -> (Result<u64, ProcessorError>, String, Arc<MemoryReporter>) {
        let (p, reporter) = processor();
        let mut output = Vec::new();
        let result = p.process(input.as_bytes(), &mut output);
        (result, String::from_utf8(output).expect("utf8"), reporter)
    }

    #[test]
    fn writes_one_row_per_input_row() {
        let input = "\
Account ID,Account Name,First Name,Created On
12345,lexcorp,Lex,1/12/11
23456,dailyplanet,Clark,3/4/12
99999,wayne,Bruce,bad
";
        let (result, output, reporter) = run(input);

        assert_eq!(result.unwrap(), 3);
        assert_eq!(
            output,
            "\
Account ID,First Name,Created On,Status,Status Set On
12345,Lex,2011-01-12,good,2011-01-12
23456,Clark,2012-03-04,closed,
99999,Bruce,,,
"
        );
        assert_eq!(
            reporter.messages_at(Level::WARN),
            vec![
                "no value for created_on in account 23456",
                "no value for status in account 99999",
                "no value for created_on in account 99999",
                "invalid 'Created On' for account 99999",
            ]
        );
        assert_eq!(reporter.messages_at(Level::INFO), vec!["processed 3 rows"]);
    }

    #[test]
    fn header_only_input_still_writes_header() {
        let (result, output, _) = run("Account ID,First Name,Created On\n");

        assert_eq!(result.unwrap(), 0);
        assert_eq!(output, "Account ID,First Name,Created On,Status,Status Set On\n");
    }

    #[test]
    fn empty_input_still_writes_header() {
        let (result, output, _) = run("");

        assert_eq!(result.unwrap(), 0);
        assert_eq!(output, "Account ID,First Name,Created On,Status,Status Set On\n");
    }

    #[test]
    fn short_records_leave_fields_null() {
        let (result, output, _) = run("Account ID,Created On,First Name\n12345,1/12/11\n");

        assert_eq!(result.unwrap(), 1);
        assert!(output.ends_with("12345,,2011-01-12,good,2011-01-12\n"));
    }

    #[test]
    fn stops_at_first_row_without_account_id() {
        let input = "\
Account ID,First Name,Created On
12345,Lex,1/12/11
,Clark,3/4/12
23456,Bruce,1/1/01
";
        let (result, output, reporter) = run(input);

        assert!(matches!(result, Err(ProcessorError::RowRejected { line: 3 })));
        assert_eq!(
            output,
            "\
Account ID,First Name,Created On,Status,Status Set On
12345,Lex,2011-01-12,good,2011-01-12
"
        );
        assert_eq!(
            reporter.messages_at(Level::ERROR),
            vec!["Input rows must have account number values"]
        );
        assert!(reporter.messages_at(Level::INFO).is_empty());
    }

    #[test]
    fn invalid_header_aborts_on_first_row() {
        let input = "Account,First Name\n12345,Lex\n";
        let (result, output, reporter) = run(input);

        assert!(matches!(result, Err(ProcessorError::RowRejected { line: 2 })));
        assert_eq!(output, "Account ID,First Name,Created On,Status,Status Set On\n");
        assert_eq!(
            reporter.messages_at(Level::ERROR),
            vec!["input CSV has invalid header"]
        );
    }

    #[test]
    fn refuses_to_replace_existing_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "Account ID\n12345\n").unwrap();
        std::fs::write(&output, "keep me").unwrap();

        let (p, _) = processor();
        let result = p.process_file(&input, &output, false, encoding_rs::UTF_8);

        assert!(matches!(result, Err(ProcessorError::InvalidArguments(_))));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

        assert_eq!(
            p.process_file(&input, &output, true, encoding_rs::UTF_8).unwrap(),
            1
        );
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .starts_with("Account ID,First Name"));
    }

    #[test]
    fn missing_input_does_not_create_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("out.csv");

        let (p, _) = processor();
        let result = p.process_file(
            &dir.path().join("missing.csv"),
            &output,
            false,
            encoding_rs::UTF_8,
        );

        assert!(matches!(result, Err(ProcessorError::IoError(_))));
        assert!(!output.exists());
    }

    #[test]
    fn reads_and_writes_in_the_chosen_encoding() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, b"Account ID,First Name,Created On\n12345,Jos\xe9,1/12/11\n").unwrap();

        let (p, _) = processor();
        let written = p
            .process_file(&input, &output, false, encoding_rs::WINDOWS_1252)
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            std::fs::read(&output).unwrap(),
            b"Account ID,First Name,Created On,Status,Status Set On\n\
12345,Jos\xe9,2011-01-12,good,2011-01-12\n"
        );
    }
}
