//! One pass over the channel.
//!
//! Messages newer than the watermark are handled oldest first. Each URL in a
//! message goes through fetch → extract → write; every step has its own
//! recovery and none of them can stop the message from being marked. Only a
//! failure to read the channel, to mark a message, or to store the new
//! watermark aborts the pass, and in those cases the watermark stays where
//! it was so the next tick starts over from the same point.
//!
//! A LinkedIn post shared next to other links is context, not a posting: its
//! text goes to the extractor with each sibling link, and it supplies their
//! source and listed date. A post shared alone is expanded into the job-board
//! links it contains, falling back to extracting the post itself.
//!
//! Marking happens whether or not the URLs produced postings: a message is
//! attempted at most once, and a failed extraction is not retried later.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    config::{AppConfig, ListedDateFallback},
    domain::{
        ChannelMessage, ChatChannel, ExtractionInput, JobExtractor, JobPosting, JobSink,
        PageContent, PageFetcher, PassReport, RecordOutcome, SlackTs, WatermarkStore,
    },
    linkedin,
    slack::extract_urls,
};

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub ack_reaction: String,
    pub warning_reaction: Option<String>,
    pub listed_date_fallback: ListedDateFallback,
    pub timezone: Tz,
    /// Used when the store holds no watermark yet.
    pub start_watermark: SlackTs,
}

impl PollerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ack_reaction: config.slack.ack_reaction.clone(),
            warning_reaction: config.slack.warning_reaction.clone(),
            listed_date_fallback: config.listed_date_fallback,
            timezone: config.timezone,
            start_watermark: SlackTs::now_minus(config.watermark.startup_lookback),
        }
    }
}

/// Where a single page ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Written(RecordOutcome),
    NothingExtracted,
    ExtractionFailed,
    WriteFailed,
}

#[derive(Debug, Default)]
struct MessageTally {
    created: usize,
    duplicates: usize,
    failed: usize,
}

impl MessageTally {
    fn add(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Written(RecordOutcome::Created) => self.created += 1,
            PageOutcome::Written(RecordOutcome::Duplicate) => self.duplicates += 1,
            PageOutcome::NothingExtracted
            | PageOutcome::ExtractionFailed
            | PageOutcome::WriteFailed => self.failed += 1,
        }
    }
}

/// A message's URLs, split into the LinkedIn post that gives them context
/// (the first one, if any) and the links to extract postings from.
#[derive(Debug, PartialEq, Eq)]
struct MessageUrls<'a> {
    post: Option<&'a str>,
    jobs: Vec<&'a str>,
}

impl<'a> MessageUrls<'a> {
    fn classify(urls: &'a [String]) -> Self {
        let mut post: Option<&'a str> = None;
        let mut jobs = Vec::new();
        for url in urls {
            let url = url.as_str();
            match post {
                None if linkedin::is_post_url(url) => post = Some(url),
                Some(seen) if seen == url => {}
                _ => jobs.push(url),
            }
        }
        Self { post, jobs }
    }
}

pub struct Poller {
    chat: Arc<dyn ChatChannel>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn JobExtractor>,
    sink: Arc<dyn JobSink>,
    watermark: Arc<dyn WatermarkStore>,
    settings: PollerSettings,
}

impl Poller {
    pub fn new(
        chat: Arc<dyn ChatChannel>,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn JobExtractor>,
        sink: Arc<dyn JobSink>,
        watermark: Arc<dyn WatermarkStore>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            chat,
            fetcher,
            extractor,
            sink,
            watermark,
            settings,
        }
    }

    pub async fn run_pass(&self) -> Result<PassReport> {
        let watermark = self
            .watermark
            .get()
            .await
            .context("failed to read watermark")?
            .unwrap_or(self.settings.start_watermark);
        tracing::info!(target: "poller", since = %watermark, "polling channel");

        let messages = self
            .chat
            .history_since(watermark)
            .await
            .context("failed to read channel history")?;

        let mut report = PassReport {
            messages: messages.len(),
            ..Default::default()
        };
        if messages.is_empty() {
            tracing::info!(target: "poller", "no new messages");
            return Ok(report);
        }

        let mut highest = watermark;
        for message in &messages {
            self.handle_message(message, &mut report).await?;
            highest = highest.max(message.ts);
        }

        self.watermark
            .set(highest)
            .await
            .context("failed to store watermark")?;
        tracing::info!(target: "poller", watermark = %highest, %report, "pass complete");
        Ok(report)
    }

    async fn handle_message(&self, message: &ChannelMessage, report: &mut PassReport) -> Result<()> {
        if message.has_reaction(&self.settings.ack_reaction) {
            tracing::debug!(target: "poller", ts = %message.ts, "already marked; skipping");
            report.skipped += 1;
            return Ok(());
        }

        let urls = extract_urls(&message.text);
        if urls.is_empty() {
            report.skipped += 1;
            return Ok(());
        }
        tracing::info!(target: "poller", ts = %message.ts, urls = ?urls, "processing message");

        report.urls += urls.len();
        let split = MessageUrls::classify(&urls);
        let mut tally = MessageTally::default();
        match split.post {
            None => {
                for url in split.jobs {
                    tally.add(self.handle_job(message, url, None, url, None).await);
                }
            }
            Some(post_url) => {
                self.handle_post_message(message, post_url, &split.jobs, &mut tally)
                    .await
            }
        }

        report.created += tally.created;
        report.duplicates += tally.duplicates;
        report.failed += tally.failed;
        self.mark(message, tally.failed > 0).await
    }

    /// The post is fetched once. With sibling links it only supplies context,
    /// the source and the listed date; on its own it is expanded into the
    /// job-board links it contains, or extracted itself when there are none.
    async fn handle_post_message(
        &self,
        message: &ChannelMessage,
        post_url: &str,
        jobs: &[&str],
        tally: &mut MessageTally,
    ) {
        let post = self.fetch(post_url).await;
        let activity_date = linkedin::activity_date(post_url);

        let embedded;
        let targets: Vec<&str> = if !jobs.is_empty() {
            jobs.to_vec()
        } else {
            embedded = linkedin::job_board_links(&post.links, post_url);
            if embedded.is_empty() {
                let input = ExtractionInput {
                    url: post_url.to_string(),
                    page_title: post.title,
                    page_text: post.text,
                    post_context: None,
                    message_text: message.text.clone(),
                };
                tally.add(self.extract_and_write(message, post_url, input, activity_date).await);
                return;
            }
            tracing::info!(
                target: "poller",
                url = post_url,
                found = embedded.len(),
                "job board links found inside post"
            );
            embedded.iter().map(String::as_str).collect()
        };

        for job_url in targets {
            let outcome = self
                .handle_job(message, job_url, Some(&post), post_url, activity_date)
                .await;
            tally.add(outcome);
        }
    }

    async fn handle_job(
        &self,
        message: &ChannelMessage,
        url: &str,
        post: Option<&PageContent>,
        source_url: &str,
        activity_date: Option<NaiveDate>,
    ) -> PageOutcome {
        let page = self.fetch(url).await;
        let input = ExtractionInput {
            url: url.to_string(),
            page_title: page.title,
            page_text: page.text,
            post_context: post
                .map(|post| post.text.clone())
                .filter(|text| !text.trim().is_empty()),
            message_text: message.text.clone(),
        };
        self.extract_and_write(message, source_url, input, activity_date)
            .await
    }

    /// Fetch failures degrade to an empty page.
    async fn fetch(&self, url: &str) -> PageContent {
        match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(target: "web", url, error = %err, "fetch failed; continuing without page content");
                PageContent::default()
            }
        }
    }

    async fn extract_and_write(
        &self,
        message: &ChannelMessage,
        source_url: &str,
        input: ExtractionInput,
        activity_date: Option<NaiveDate>,
    ) -> PageOutcome {
        let extracted = match self.extractor.extract(&input).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!(target: "ai", url = %input.url, "no content to extract job details from");
                return PageOutcome::NothingExtracted;
            }
            Err(err) => {
                tracing::error!(target: "ai", url = %input.url, error = %err, "job extraction failed");
                return PageOutcome::ExtractionFailed;
            }
        };

        let listed_date = activity_date
            .or_else(|| extracted.listed_date())
            .or_else(|| self.fallback_date(message));
        let posting = JobPosting::from_extracted(extracted, &input.url, source_url, listed_date);

        match self.sink.record(&posting).await {
            Ok(outcome) => PageOutcome::Written(outcome),
            Err(err) => {
                tracing::error!(
                    target: "notion",
                    url = %input.url,
                    company = %posting.company,
                    error = %err,
                    "failed to write posting; dropping it"
                );
                PageOutcome::WriteFailed
            }
        }
    }

    fn fallback_date(&self, message: &ChannelMessage) -> Option<NaiveDate> {
        match self.settings.listed_date_fallback {
            ListedDateFallback::None => None,
            ListedDateFallback::MessageDate => message.ts.calendar_date(&self.settings.timezone),
        }
    }

    async fn mark(&self, message: &ChannelMessage, had_failures: bool) -> Result<()> {
        if had_failures {
            if let Some(warning) = &self.settings.warning_reaction {
                if let Err(err) = self.chat.add_reaction(message.ts, warning).await {
                    tracing::warn!(target: "slack", ts = %message.ts, error = %err, "failed to add warning reaction");
                }
            }
        }

        self.chat
            .add_reaction(message.ts, &self.settings.ack_reaction)
            .await
            .with_context(|| format!("failed to mark message {} as handled", message.ts))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        domain::{EmploymentType, ExtractedJob},
        tasks::{
            testing::{message, FakeChat, FakeExtractor, FakeFetcher, FakeSink},
            watermark::InMemoryWatermarkStore,
        },
    };

    const ACK: &str = "white_check_mark";
    const WARN: &str = "warning";
    const START: SlackTs = SlackTs::new(1_700_000_000, 0);

    fn acme() -> ExtractedJob {
        ExtractedJob {
            company_name: Some("Acme".into()),
            open_role: Some("Engineer".into()),
            job_type: Some("full-time".into()),
            location: Some("Remote".into()),
            compensation_range: Some("unknown".into()),
            link_to_apply: None,
            job_listed_date: None,
        }
        .normalized()
    }

    fn settings() -> PollerSettings {
        PollerSettings {
            ack_reaction: ACK.into(),
            warning_reaction: Some(WARN.into()),
            listed_date_fallback: ListedDateFallback::None,
            timezone: Tz::UTC,
            start_watermark: START,
        }
    }

    struct Harness {
        chat: Arc<FakeChat>,
        fetcher: Arc<FakeFetcher>,
        extractor: Arc<FakeExtractor>,
        sink: Arc<FakeSink>,
        store: Arc<InMemoryWatermarkStore>,
        poller: Poller,
    }

    fn harness(chat: FakeChat, fetcher: FakeFetcher, extractor: FakeExtractor, sink: FakeSink) -> Harness {
        harness_with(chat, fetcher, extractor, sink, settings())
    }

    fn harness_with(
        chat: FakeChat,
        fetcher: FakeFetcher,
        extractor: FakeExtractor,
        sink: FakeSink,
        settings: PollerSettings,
    ) -> Harness {
        let chat = Arc::new(chat);
        let fetcher = Arc::new(fetcher);
        let extractor = Arc::new(extractor);
        let sink = Arc::new(sink);
        let store = Arc::new(InMemoryWatermarkStore::new());
        let poller = Poller::new(
            chat.clone(),
            fetcher.clone(),
            extractor.clone(),
            sink.clone(),
            store.clone(),
            settings,
        );
        Harness {
            chat,
            fetcher,
            extractor,
            sink,
            store,
            poller,
        }
    }

    fn ts(offset: i64) -> SlackTs {
        SlackTs::new(1_700_000_000 + offset, 100)
    }

    #[tokio::test]
    async fn slack_link_becomes_one_record_and_a_reaction() {
        let h = harness(
            FakeChat::with_messages(vec![message(
                ts(1),
                "Check this out: <https://example.com/jobs/42|Jobs>",
            )]),
            FakeFetcher::default().with_page(
                "https://example.com/jobs/42",
                "Acme is hiring an Engineer. Remote. Full-time.",
                &[],
            ),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let report = h.poller.run_pass().await.unwrap();

        let records = h.sink.records.lock().clone();
        assert_eq!(records.len(), 1);
        let posting = &records[0];
        assert_eq!(posting.company, "Acme");
        assert_eq!(posting.role, "Engineer");
        assert_eq!(posting.employment_type, EmploymentType::FullTime);
        assert_eq!(posting.location, "Remote");
        assert_eq!(posting.compensation, None);
        assert_eq!(posting.listed_date, None);
        assert_eq!(posting.source_url, "https://example.com/jobs/42");
        assert_eq!(posting.apply_url, "https://example.com/jobs/42");

        assert_eq!(h.chat.reactions_on(ts(1)), vec![ACK.to_string()]);
        assert_eq!(report.created, 1);
        assert_eq!(h.store.get().await.unwrap(), Some(ts(1)));
    }

    #[tokio::test]
    async fn fetch_failure_on_one_url_still_marks_the_message() {
        let h = harness(
            FakeChat::with_messages(vec![message(
                ts(1),
                "two roles: https://down.example/jobs/1 and <https://example.com/jobs/2>",
            )]),
            FakeFetcher::default().with_page("https://example.com/jobs/2", "Acme Engineer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let report = h.poller.run_pass().await.unwrap();

        assert_eq!(h.sink.records.lock().len(), 1);
        assert_eq!(h.sink.records.lock()[0].source_url, "https://example.com/jobs/2");
        let reactions = h.chat.reactions_on(ts(1));
        assert!(reactions.contains(&ACK.to_string()));
        assert!(reactions.contains(&WARN.to_string()));
        assert_eq!((report.urls, report.created, report.failed), (2, 1, 1));
        // the failed URL was still attempted
        assert_eq!(h.extractor.inputs.lock().len(), 2);
    }

    #[tokio::test]
    async fn second_pass_without_new_messages_is_a_no_op() {
        let h = harness(
            FakeChat::with_messages(vec![
                message(ts(1), "<https://example.com/jobs/1>"),
                message(ts(2), "no links here"),
            ]),
            FakeFetcher::default().with_page("https://example.com/jobs/1", "Acme Engineer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        h.poller.run_pass().await.unwrap();
        let records = h.sink.records.lock().len();
        let reactions = h.chat.reactions.lock().len();

        let report = h.poller.run_pass().await.unwrap();
        assert_eq!(report, PassReport::default());
        assert_eq!(h.sink.records.lock().len(), records);
        assert_eq!(h.chat.reactions.lock().len(), reactions);
        assert_eq!(h.chat.history_calls.lock().last(), Some(&ts(2)));
    }

    #[tokio::test]
    async fn watermark_advances_past_skipped_messages_and_never_decreases() {
        let h = harness(
            FakeChat::with_messages(vec![message(ts(5), "morning all")]),
            FakeFetcher::default(),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let mut seen = Vec::new();
        h.poller.run_pass().await.unwrap();
        seen.push(h.store.get().await.unwrap());

        h.chat.push(message(ts(7), "still nothing"));
        h.poller.run_pass().await.unwrap();
        seen.push(h.store.get().await.unwrap());

        h.poller.run_pass().await.unwrap();
        seen.push(h.store.get().await.unwrap());

        assert_eq!(seen, vec![Some(ts(5)), Some(ts(7)), Some(ts(7))]);
        assert!(h.chat.reactions.lock().is_empty());
    }

    #[tokio::test]
    async fn history_failure_aborts_without_moving_the_watermark() {
        let chat = FakeChat::with_messages(vec![message(ts(1), "<https://example.com/jobs/1>")]);
        *chat.fail_history.lock() = true;
        let h = harness(
            chat,
            FakeFetcher::default(),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        assert!(h.poller.run_pass().await.is_err());
        assert_eq!(h.store.get().await.unwrap(), None);

        *h.chat.fail_history.lock() = false;
        h.poller.run_pass().await.unwrap();
        assert_eq!(h.chat.history_calls.lock().as_slice(), &[START, START]);
    }

    #[tokio::test]
    async fn mark_failure_aborts_the_pass() {
        let chat = FakeChat::with_messages(vec![
            message(ts(1), "<https://example.com/jobs/1>"),
            message(ts(2), "<https://example.com/jobs/2>"),
        ]);
        chat.failing_reactions.lock().push(ACK.into());
        let h = harness(
            chat,
            FakeFetcher::default()
                .with_page("https://example.com/jobs/1", "Acme Engineer", &[])
                .with_page("https://example.com/jobs/2", "Acme Designer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let err = h.poller.run_pass().await.unwrap_err();
        assert!(err.to_string().contains("failed to mark message"));
        assert_eq!(h.store.get().await.unwrap(), None);
        // the second message was never reached
        assert_eq!(h.fetcher.fetched.lock().as_slice(), &["https://example.com/jobs/1".to_string()]);
    }

    #[tokio::test]
    async fn write_and_extraction_errors_drop_only_that_posting() {
        let extractor = FakeExtractor {
            failing_urls: vec!["https://example.com/jobs/bad-json".into()],
            ..FakeExtractor::returning(acme())
        };
        let sink = FakeSink {
            failing_apply_urls: vec!["https://example.com/jobs/rejected".into()],
            ..Default::default()
        };
        let h = harness(
            FakeChat::with_messages(vec![
                message(
                    ts(1),
                    "https://example.com/jobs/bad-json https://example.com/jobs/rejected https://example.com/jobs/ok",
                ),
                message(ts(2), "<https://example.com/jobs/later>"),
            ]),
            FakeFetcher::default()
                .with_page("https://example.com/jobs/bad-json", "page", &[])
                .with_page("https://example.com/jobs/rejected", "page", &[])
                .with_page("https://example.com/jobs/ok", "page", &[])
                .with_page("https://example.com/jobs/later", "page", &[]),
            extractor,
            sink,
        );

        let report = h.poller.run_pass().await.unwrap();

        let written: Vec<String> = h.sink.records.lock().iter().map(|p| p.apply_url.clone()).collect();
        assert_eq!(
            written,
            vec![
                "https://example.com/jobs/ok".to_string(),
                "https://example.com/jobs/later".to_string(),
            ]
        );
        assert!(h.chat.reactions_on(ts(1)).contains(&ACK.to_string()));
        assert_eq!(h.chat.reactions_on(ts(2)), vec![ACK.to_string()]);
        assert_eq!(report.failed, 2);
        assert_eq!(h.store.get().await.unwrap(), Some(ts(2)));
    }

    #[tokio::test]
    async fn activity_date_overrides_extracted_date() {
        let post = "https://www.linkedin.com/feed/update/urn:li:activity:7123456789012345678/";
        let mut job = acme();
        job.job_listed_date = Some("2024-01-15".into());
        let h = harness(
            FakeChat::with_messages(vec![message(ts(1), &format!("<{post}>"))]),
            FakeFetcher::default().with_page(post, "Acme is hiring an Engineer, DM me", &[]),
            FakeExtractor::returning(job),
            FakeSink::default(),
        );

        h.poller.run_pass().await.unwrap();

        let records = h.sink.records.lock().clone();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].listed_date, NaiveDate::from_ymd_opt(2023, 10, 26));
        assert_eq!(records[0].source_url, post);
    }

    #[tokio::test]
    async fn job_board_links_inside_a_post_are_extracted_individually() {
        let post = "https://www.linkedin.com/posts/acme_hiring-activity-7123456789012345678-AbCd";
        let greenhouse = "https://boards.greenhouse.io/acme/jobs/1";
        let lever = "https://jobs.lever.co/acme/2";
        let h = harness(
            FakeChat::with_messages(vec![message(ts(1), post)]),
            FakeFetcher::default()
                .with_page(post, "We're hiring two roles!", &[post, greenhouse, "https://acme.com", lever])
                .with_page(greenhouse, "Backend Engineer", &[])
                .with_page(lever, "Frontend Engineer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let report = h.poller.run_pass().await.unwrap();

        let records = h.sink.records.lock().clone();
        let applies: Vec<&str> = records.iter().map(|p| p.apply_url.as_str()).collect();
        assert_eq!(applies, vec![greenhouse, lever]);
        for posting in &records {
            assert_eq!(posting.source_url, post);
            assert_eq!(posting.listed_date, NaiveDate::from_ymd_opt(2023, 10, 26));
        }
        let inputs = h.extractor.inputs.lock().clone();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].post_context.as_deref(), Some("We're hiring two roles!"));
        assert_eq!(report.created, 2);
    }

    #[tokio::test]
    async fn post_next_to_a_job_link_only_supplies_context() {
        let post = "https://www.linkedin.com/posts/acme_hiring-activity-7123456789012345678-AbCd";
        let greenhouse = "https://boards.greenhouse.io/acme/jobs/1";
        let lever = "https://jobs.lever.co/acme/2";
        let h = harness(
            FakeChat::with_messages(vec![message(ts(1), &format!("<{post}> apply: <{greenhouse}>"))]),
            FakeFetcher::default()
                .with_page(post, "Acme is hiring a backend engineer", &[greenhouse, lever])
                .with_page(greenhouse, "Backend Engineer", &[])
                .with_page(lever, "Frontend Engineer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let report = h.poller.run_pass().await.unwrap();

        let records = h.sink.records.lock().clone();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].apply_url, greenhouse);
        assert_eq!(records[0].source_url, post);
        assert_eq!(records[0].listed_date, NaiveDate::from_ymd_opt(2023, 10, 26));

        let inputs = h.extractor.inputs.lock().clone();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].url, greenhouse);
        assert_eq!(
            inputs[0].post_context.as_deref(),
            Some("Acme is hiring a backend engineer")
        );
        assert_eq!(
            h.fetcher.fetched.lock().as_slice(),
            &[post.to_string(), greenhouse.to_string()]
        );
        assert_eq!((report.urls, report.created, report.failed), (2, 1, 0));
        assert_eq!(h.chat.reactions_on(ts(1)), vec![ACK.to_string()]);
    }

    #[test]
    fn first_post_becomes_context_and_repeats_of_it_are_dropped() {
        let urls: Vec<String> = [
            "https://example.com/jobs/1",
            "https://www.linkedin.com/feed/update/urn:li:activity:7123456789012345678/",
            "https://www.linkedin.com/feed/update/urn:li:activity:7123456789012345678/",
            "https://www.linkedin.com/posts/other_activity-7000000000000000000-x",
        ]
        .iter()
        .map(|u| u.to_string())
        .collect();

        assert_eq!(
            MessageUrls::classify(&urls),
            MessageUrls {
                post: Some("https://www.linkedin.com/feed/update/urn:li:activity:7123456789012345678/"),
                jobs: vec![
                    "https://example.com/jobs/1",
                    "https://www.linkedin.com/posts/other_activity-7000000000000000000-x",
                ],
            }
        );
    }

    #[tokio::test]
    async fn already_marked_messages_are_not_reprocessed() {
        let mut done = message(ts(1), "<https://example.com/jobs/1>");
        done.reactions.push(ACK.into());
        let h = harness(
            FakeChat::with_messages(vec![done]),
            FakeFetcher::default().with_page("https://example.com/jobs/1", "Acme Engineer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let report = h.poller.run_pass().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert!(h.sink.records.lock().is_empty());
        assert!(h.chat.reactions.lock().is_empty());
        assert_eq!(h.store.get().await.unwrap(), Some(ts(1)));
    }

    #[tokio::test]
    async fn duplicate_postings_are_counted_not_failed() {
        let h = harness(
            FakeChat::with_messages(vec![message(
                ts(1),
                "<https://example.com/jobs/1> and again <https://example.com/jobs/1|same job>",
            )]),
            FakeFetcher::default().with_page("https://example.com/jobs/1", "Acme Engineer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
        );

        let report = h.poller.run_pass().await.unwrap();

        assert_eq!((report.urls, report.created, report.duplicates, report.failed), (2, 1, 1, 0));
        assert_eq!(h.chat.reactions_on(ts(1)), vec![ACK.to_string()]);
    }

    #[tokio::test]
    async fn message_date_fallback_is_opt_in() {
        let mut settings = settings();
        settings.listed_date_fallback = ListedDateFallback::MessageDate;
        // 2024-03-01T02:00:00Z
        let at = SlackTs::new(1_709_258_400, 0);
        let h = harness_with(
            FakeChat::with_messages(vec![message(at, "<https://example.com/jobs/1>")]),
            FakeFetcher::default().with_page("https://example.com/jobs/1", "Acme Engineer", &[]),
            FakeExtractor::returning(acme()),
            FakeSink::default(),
            PollerSettings {
                start_watermark: SlackTs::new(1_709_000_000, 0),
                ..settings
            },
        );

        h.poller.run_pass().await.unwrap();

        assert_eq!(
            h.sink.records.lock()[0].listed_date,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }
}
