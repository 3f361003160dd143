//! Timed demo automaton: Typing → Submitting → Analyzing → Classified → Typing.
//!
//! Transitions are computed by the pure [`step`] function. [`Workflow`] owns
//! the virtual timer queue, the injected [`Clock`] and the running
//! [`WorkflowContext`]; a driver calls [`Workflow::poll`] whenever the clock
//! may have reached [`Workflow::next_due`].

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::WorkflowTimings;
use crate::error::{Error, Result};
use crate::models::{Classification, Sentiment};
use crate::pipeline::FeedbackAnalyzer;

pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Timers ordered by due time, then by scheduling order.
#[derive(Debug)]
pub struct TimerQueue<E> {
    entries: BTreeMap<(Duration, u64), E>,
    next_seq: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<E> TimerQueue<E> {
    pub fn schedule(&mut self, due: Duration, event: E) {
        self.entries.insert((due, self.next_seq), event);
        self.next_seq += 1;
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Removes and returns the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let key = *self.entries.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.entries.remove(&key).map(|event| (key.0, event))
    }

    /// Drops every pending timer and returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowState {
    Typing,
    Submitting,
    Analyzing,
    Classified,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::Typing => "typing",
            WorkflowState::Submitting => "submitting",
            WorkflowState::Analyzing => "analyzing",
            WorkflowState::Classified => "classified",
        };
        f.write_str(label)
    }
}

/// Routing categories used by the demo samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DemoCategory {
    MaterialQuality,
    Pricing,
    Delivery,
    Service,
    Returns,
    Other,
}

impl DemoCategory {
    pub const ALL: [DemoCategory; 6] = [
        DemoCategory::MaterialQuality,
        DemoCategory::Pricing,
        DemoCategory::Delivery,
        DemoCategory::Service,
        DemoCategory::Returns,
        DemoCategory::Other,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            DemoCategory::MaterialQuality => "Material Quality",
            DemoCategory::Pricing => "Pricing",
            DemoCategory::Delivery => "Delivery",
            DemoCategory::Service => "Service",
            DemoCategory::Returns => "Returns",
            DemoCategory::Other => "Other",
        }
    }
}

impl fmt::Display for DemoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A curated sample with its expected routing, which the workflow trusts
/// instead of re-deriving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoSample {
    pub text: String,
    pub category: DemoCategory,
    pub sentiment: Sentiment,
    /// Routing confidence in percent.
    pub confidence: u8,
    pub priority: Priority,
}

impl DemoSample {
    pub fn new(
        text: impl Into<String>,
        category: DemoCategory,
        sentiment: Sentiment,
        confidence: u8,
        priority: Priority,
    ) -> Self {
        Self {
            text: text.into(),
            category,
            sentiment,
            confidence: confidence.min(100),
            priority,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

pub fn demo_samples() -> Vec<DemoSample> {
    vec![
        DemoSample::new(
            "The material quality is really poor and doesn't match the price. Very disappointed with this purchase.",
            DemoCategory::MaterialQuality,
            Sentiment::Negative,
            94,
            Priority::High,
        ),
        DemoSample::new(
            "Amazing product! Fast delivery and great service. Highly recommend to everyone!",
            DemoCategory::Delivery,
            Sentiment::Positive,
            92,
            Priority::Low,
        ),
        DemoSample::new(
            "Return process was a nightmare. Took weeks to get my refund and had to call multiple times.",
            DemoCategory::Returns,
            Sentiment::Negative,
            87,
            Priority::High,
        ),
        DemoSample::new(
            "Too expensive for what you get. Not worth the money at all. Better alternatives exist.",
            DemoCategory::Pricing,
            Sentiment::Negative,
            89,
            Priority::Medium,
        ),
        DemoSample::new(
            "I'm not sure what category this fits in, but I wanted to share my general feedback about the company.",
            DemoCategory::Other,
            Sentiment::Positive,
            75,
            Priority::Low,
        ),
        DemoSample::new(
            "The service team was extremely helpful when I had an issue with my order. Quick resolution!",
            DemoCategory::Service,
            Sentiment::Positive,
            96,
            Priority::Low,
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }
}

/// Running per-category counters for one run of the workflow. Created on
/// start and handed back on stop; only the workflow mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowContext {
    counts: BTreeMap<DemoCategory, SentimentCounts>,
    total_processed: usize,
}

impl WorkflowContext {
    fn new() -> Self {
        Self {
            counts: DemoCategory::ALL
                .into_iter()
                .map(|category| (category, SentimentCounts::default()))
                .collect(),
            total_processed: 0,
        }
    }

    fn record(&mut self, category: DemoCategory, sentiment: Sentiment) {
        self.counts.entry(category).or_default().add(sentiment);
        self.total_processed += 1;
    }

    pub fn counts(&self) -> &BTreeMap<DemoCategory, SentimentCounts> {
        &self.counts
    }

    pub fn counts_for(&self, category: DemoCategory) -> SentimentCounts {
        self.counts.get(&category).copied().unwrap_or_default()
    }

    pub fn total_processed(&self) -> usize {
        self.total_processed
    }

    pub fn totals(&self) -> SentimentCounts {
        self.counts
            .values()
            .fold(SentimentCounts::default(), |mut acc, counts| {
                acc.positive += counts.positive;
                acc.negative += counts.negative;
                acc.neutral += counts.neutral;
                acc
            })
    }

    /// Positive share of polar results. 50 when nothing polar was seen yet.
    pub fn positive_share_pct(&self) -> f64 {
        let totals = self.totals();
        let polar = totals.positive + totals.negative;
        if polar == 0 {
            return 50.0;
        }
        crate::models::percentage(totals.positive, polar)
    }
}

/// Immutable view of where the automaton is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowView {
    pub state: WorkflowState,
    pub sample_index: usize,
    /// Characters of the current sample revealed so far.
    pub revealed: usize,
    pub transfer_visible: bool,
}

impl WorkflowView {
    pub fn initial() -> Self {
        Self {
            state: WorkflowState::Typing,
            sample_index: 0,
            revealed: 0,
            transfer_visible: false,
        }
    }

    pub fn typed_text<'a>(&self, sample: &'a DemoSample) -> &'a str {
        match sample.text.char_indices().nth(self.revealed) {
            Some((end, _)) => &sample.text[..end],
            None => &sample.text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    RevealChar,
    FinishTyping,
    ShowTransfer,
    EnterAnalyzing,
    Classify,
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    StateChanged { from: WorkflowState, to: WorkflowState },
    CharRevealed { revealed: usize },
    TransferShown,
    TransferHidden,
    ClassifySample { sample_index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub view: WorkflowView,
    pub next_delay: Duration,
    pub next_tick: Tick,
    pub outcomes: Vec<Outcome>,
}

/// Pure transition function. `sample_count` must be non-zero.
pub fn step(
    view: &WorkflowView,
    tick: Tick,
    current: &DemoSample,
    sample_count: usize,
    timings: &WorkflowTimings,
) -> Transition {
    let mut next = *view;
    let mut outcomes = Vec::new();

    let (next_delay, next_tick) = match tick {
        Tick::RevealChar => {
            let len = current.char_len();
            if next.revealed < len {
                next.revealed += 1;
                outcomes.push(Outcome::CharRevealed {
                    revealed: next.revealed,
                });
            }
            if next.revealed >= len {
                (timings.typing_settle(), Tick::FinishTyping)
            } else {
                (timings.type_interval(), Tick::RevealChar)
            }
        }
        Tick::FinishTyping => {
            change_state(&mut next, WorkflowState::Submitting, &mut outcomes);
            (timings.submit_delay(), Tick::ShowTransfer)
        }
        Tick::ShowTransfer => {
            next.transfer_visible = true;
            outcomes.push(Outcome::TransferShown);
            (timings.transfer(), Tick::EnterAnalyzing)
        }
        Tick::EnterAnalyzing => {
            next.transfer_visible = false;
            outcomes.push(Outcome::TransferHidden);
            change_state(&mut next, WorkflowState::Analyzing, &mut outcomes);
            (timings.analyze_delay(), Tick::Classify)
        }
        Tick::Classify => {
            outcomes.push(Outcome::ClassifySample {
                sample_index: next.sample_index,
            });
            change_state(&mut next, WorkflowState::Classified, &mut outcomes);
            (timings.display(), Tick::Advance)
        }
        Tick::Advance => {
            next.sample_index = (next.sample_index + 1) % sample_count.max(1);
            next.revealed = 0;
            change_state(&mut next, WorkflowState::Typing, &mut outcomes);
            (timings.type_interval(), Tick::RevealChar)
        }
    };

    Transition {
        view: next,
        next_delay,
        next_tick,
        outcomes,
    }
}

fn change_state(view: &mut WorkflowView, to: WorkflowState, outcomes: &mut Vec<Outcome>) {
    outcomes.push(Outcome::StateChanged {
        from: view.state,
        to,
    });
    view.state = to;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WorkflowEvent {
    StateChanged {
        from: WorkflowState,
        to: WorkflowState,
    },
    CharRevealed {
        sample_index: usize,
        revealed: usize,
    },
    TransferShown,
    TransferHidden,
    Classified {
        sample_index: usize,
        category: DemoCategory,
        sentiment: Sentiment,
        confidence: u8,
        priority: Priority,
        classification: Classification,
    },
}

/// Owned copy of the automaton's observable state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowSnapshot {
    pub view: WorkflowView,
    pub typed_text: String,
    pub context: WorkflowContext,
}

pub struct Workflow<C: Clock> {
    clock: C,
    analyzer: FeedbackAnalyzer,
    samples: Vec<DemoSample>,
    timings: WorkflowTimings,
    view: WorkflowView,
    context: Option<WorkflowContext>,
    timers: TimerQueue<Tick>,
}

impl<C: Clock> Workflow<C> {
    pub fn new(
        clock: C,
        analyzer: FeedbackAnalyzer,
        samples: Vec<DemoSample>,
        timings: WorkflowTimings,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySampleSet);
        }
        let cycle = timings.type_interval()
            + timings.typing_settle()
            + timings.submit_delay()
            + timings.transfer()
            + timings.analyze_delay()
            + timings.display();
        if cycle.is_zero() {
            return Err(Error::Config(
                "workflow timings must not all be zero".to_string(),
            ));
        }

        Ok(Self {
            clock,
            analyzer,
            samples,
            timings,
            view: WorkflowView::initial(),
            context: None,
            timers: TimerQueue::default(),
        })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn view(&self) -> &WorkflowView {
        &self.view
    }

    pub fn current_sample(&self) -> &DemoSample {
        &self.samples[self.view.sample_index]
    }

    pub fn is_running(&self) -> bool {
        self.context.is_some()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Starts from Typing on the first sample with fresh counters. A running
    /// workflow is reset.
    pub fn start(&mut self) {
        self.timers.cancel_all();
        self.view = WorkflowView::initial();
        self.context = Some(WorkflowContext::new());
        let now = self.clock.now();
        self.timers
            .schedule(now + self.timings.type_interval(), Tick::RevealChar);
        tracing::info!(samples = self.samples.len(), "workflow started");
    }

    /// Cancels every pending transition and hands back the run's counters.
    pub fn stop(&mut self) -> Option<WorkflowContext> {
        let cancelled = self.timers.cancel_all();
        let context = self.context.take();
        if let Some(context) = &context {
            tracing::info!(
                cancelled,
                processed = context.total_processed(),
                "workflow stopped"
            );
        }
        context
    }

    pub fn snapshot(&self) -> Option<WorkflowSnapshot> {
        let context = self.context.clone()?;
        Some(WorkflowSnapshot {
            view: self.view,
            typed_text: self.view.typed_text(self.current_sample()).to_string(),
            context,
        })
    }

    /// Fires every timer due at the clock's current time, in order.
    pub fn poll(&mut self) -> Vec<WorkflowEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        while let Some((due, tick)) = self.timers.pop_due(now) {
            let transition = step(
                &self.view,
                tick,
                &self.samples[self.view.sample_index],
                self.samples.len(),
                &self.timings,
            );

            for outcome in &transition.outcomes {
                events.push(self.apply(*outcome, &transition.view));
            }

            self.view = transition.view;
            self.timers
                .schedule(due + transition.next_delay, transition.next_tick);
        }

        events
    }

    fn apply(&mut self, outcome: Outcome, next: &WorkflowView) -> WorkflowEvent {
        match outcome {
            Outcome::StateChanged { from, to } => {
                tracing::debug!(%from, %to, sample = next.sample_index, "workflow transition");
                WorkflowEvent::StateChanged { from, to }
            }
            Outcome::CharRevealed { revealed } => WorkflowEvent::CharRevealed {
                sample_index: next.sample_index,
                revealed,
            },
            Outcome::TransferShown => WorkflowEvent::TransferShown,
            Outcome::TransferHidden => WorkflowEvent::TransferHidden,
            Outcome::ClassifySample { sample_index } => {
                let sample = &self.samples[sample_index];
                let classification = self.analyzer.classify(&sample.text);
                if let Some(context) = self.context.as_mut() {
                    context.record(sample.category, sample.sentiment);
                }
                tracing::info!(
                    sample = sample_index,
                    category = %sample.category,
                    sentiment = %sample.sentiment,
                    priority = %sample.priority,
                    scored = %classification.label,
                    "sample classified"
                );
                WorkflowEvent::Classified {
                    sample_index,
                    category: sample.category,
                    sentiment: sample.sentiment,
                    confidence: sample.confidence,
                    priority: sample.priority,
                    classification,
                }
            }
        }
    }
}
