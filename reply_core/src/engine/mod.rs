//! Engine - the turn-level orchestrator.
//!
//! Each inbound event is handled to completion:
//! 1. **Commands**: Messages addressing the agent may be operator commands
//! 2. **Ingestion**: Everything else is learned (log append or tokenizer only)
//! 3. **Pickup**: Known words in the input become the turn's topic words
//! 4. **Attention**: The attention model yields a response probability
//! 5. **Reply**: If triggered, a base message is retrieved and rewritten
//!
//! All randomness comes from one seeded [`ChaCha8Rng`].

mod command;
mod generator;
mod ingest;
mod retrieval;
mod speech;
mod usability;

pub use command::*;
pub use generator::*;
pub use ingest::InputWords;
pub use retrieval::{MAX_LINKED_CANDIDATES, RANDOM_FALLBACK_SAMPLES};
pub use usability::RecencyRing;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chat_corpus::{
    AssociationTable, BigramIndex, FollowUpLinker, MessageLog, ResponseLinker, SimilarityIndex,
    Vocabulary, VocabularyLearner, WordAssociator,
};

use crate::attention::{AttentionModel, TalkMode};
use crate::client::ChatClient;
use crate::error::EngineResult;
use crate::settings::{EngineConfig, Settings};
use crate::thought::ThoughtRecorder;

/// Settings file inside a data directory.
pub const SETTINGS_FILE: &str = "setting.toml";
/// Conversation log inside a data directory.
pub const LOG_FILE: &str = "log.jsonl";
/// Vocabulary inside a data directory.
pub const WORDS_FILE: &str = "words.json";
/// Association table inside a data directory.
pub const ASSOC_FILE: &str = "assoc.txt";
/// Thought trace inside a data directory.
pub const THOUGHT_FILE: &str = "thought.txt";

/// Whether the caller should keep feeding events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineControl {
    /// Keep going.
    Continue,
    /// The agent was told to shut down.
    Exit,
}

/// Assembles a [`ChatEngine`] from its collaborators.
pub struct EngineBuilder {
    settings: Settings,
    settings_path: Option<PathBuf>,
    fixed: toml::Table,
    log: MessageLog,
    vocabulary: Vocabulary,
    similarity: Option<Rc<RefCell<dyn SimilarityIndex>>>,
    associations: Box<dyn AssociationTable>,
    linker: Box<dyn ResponseLinker>,
    thoughts: ThoughtRecorder,
    client: Option<Box<dyn ChatClient>>,
    seed: Option<u64>,
}

impl EngineBuilder {
    /// Start from settings, with in-memory collaborators.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            settings_path: None,
            fixed: toml::Table::new(),
            log: MessageLog::new(),
            vocabulary: Vocabulary::new(),
            similarity: None,
            associations: Box::new(WordAssociator::new()),
            linker: Box::new(FollowUpLinker::default()),
            thoughts: ThoughtRecorder::disabled(),
            client: None,
            seed: None,
        }
    }

    /// Reload settings from this file, with `fixed` merged over it.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>, fixed: toml::Table) -> Self {
        self.settings_path = Some(path.into());
        self.fixed = fixed;
        self
    }

    /// Start from an existing conversation log.
    pub fn with_log(mut self, log: MessageLog) -> Self {
        self.log = log;
        self
    }

    /// Start from an existing vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Use a custom similarity index instead of the bigram index.
    pub fn with_similarity(mut self, similarity: impl SimilarityIndex + 'static) -> Self {
        self.similarity = Some(Rc::new(RefCell::new(similarity)));
        self
    }

    /// Use this association table for topic expansion.
    pub fn with_associations(mut self, associations: impl AssociationTable + 'static) -> Self {
        self.associations = Box::new(associations);
        self
    }

    /// Use a custom response linker instead of [`FollowUpLinker`].
    pub fn with_linker(mut self, linker: impl ResponseLinker + 'static) -> Self {
        self.linker = Box::new(linker);
        self
    }

    /// Write thought records here. Disabled by default.
    pub fn with_thoughts(mut self, thoughts: ThoughtRecorder) -> Self {
        self.thoughts = thoughts;
        self
    }

    /// Attach a transport from the start.
    pub fn with_client(mut self, client: impl ChatClient + 'static) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// Seed the random source. Takes precedence over the `seed` setting.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Wire the collaborators together.
    pub fn build(self) -> EngineResult<ChatEngine> {
        let config = EngineConfig::from_settings(&self.settings)?;
        let commands = CommandTable::new()?;

        let vocabulary = Rc::new(RefCell::new(self.vocabulary));
        let learner = Rc::new(RefCell::new(VocabularyLearner::new(
            vocabulary.clone(),
            self.settings.tokenizer.build(),
        )));
        let similarity: Rc<RefCell<dyn SimilarityIndex>> = match self.similarity {
            Some(similarity) => similarity,
            None => Rc::new(RefCell::new(BigramIndex::with_defaults())),
        };

        let mut log = self.log;
        similarity.borrow_mut().index_log(&log);
        log.subscribe(Box::new(similarity.clone()));
        log.subscribe(Box::new(learner.clone()));

        let seed = self
            .seed
            .or(self.settings.seed)
            .unwrap_or_else(rand::random);
        let adoption_border = vocabulary.borrow().adoption_border();
        tracing::debug!(seed, adoption_border, words = vocabulary.borrow().len(), "Engine ready");

        let mode = TalkMode::default();
        let mut engine = ChatEngine {
            settings: self.settings,
            settings_path: self.settings_path,
            fixed: self.fixed,
            target_nick: None,
            mode,
            log,
            vocabulary,
            learner,
            similarity,
            associations: self.associations,
            linker: self.linker,
            attention: AttentionModel::new(mode),
            client: self.client,
            thoughts: self.thoughts,
            rng: ChaCha8Rng::seed_from_u64(seed),
            inputs: InputWords::default(),
            recent_bases: RecencyRing::new(config.repeat_proof_count),
            adoption_border,
            commands,
            last_speech_input: None,
            last_speech: None,
            config: config.clone(),
        };
        engine.apply_config(config);
        engine.update_status();
        Ok(engine)
    }
}

/// The reply engine of a learning chat agent.
pub struct ChatEngine {
    settings: Settings,
    settings_path: Option<PathBuf>,
    fixed: toml::Table,
    config: EngineConfig,

    /// Senders usable as base messages. Starts from the config and is
    /// changed by impersonation commands.
    target_nick: Option<Regex>,

    mode: TalkMode,
    log: MessageLog,
    vocabulary: Rc<RefCell<Vocabulary>>,
    learner: Rc<RefCell<VocabularyLearner>>,
    similarity: Rc<RefCell<dyn SimilarityIndex>>,
    associations: Box<dyn AssociationTable>,
    linker: Box<dyn ResponseLinker>,
    attention: AttentionModel,
    client: Option<Box<dyn ChatClient>>,
    thoughts: ThoughtRecorder,
    rng: ChaCha8Rng,
    inputs: InputWords,

    /// Base messages used recently; they are not reused.
    recent_bases: RecencyRing,

    /// Words seen in at least this many messages are not adopted.
    adoption_border: usize,

    commands: CommandTable,

    /// What the agent last replied to.
    last_speech_input: Option<String>,

    /// The last thing said by anyone, used as the stimulus during silence.
    last_speech: Option<String>,
}

impl ChatEngine {
    /// Open an engine over a data directory.
    ///
    /// The directory holds `setting.toml`, `log.jsonl`, `words.json`,
    /// `assoc.txt` and `thought.txt`; missing files start empty.
    pub fn open(dir: impl AsRef<Path>, fixed: toml::Table) -> EngineResult<Self> {
        let dir = dir.as_ref();
        let settings_path = dir.join(SETTINGS_FILE);
        let settings = Settings::load(&settings_path, &fixed)?;
        tracing::info!("Opening data directory {}", dir.display());

        EngineBuilder::new(settings)
            .with_settings_path(settings_path, fixed)
            .with_log(MessageLog::open(dir.join(LOG_FILE))?)
            .with_vocabulary(Vocabulary::open(dir.join(WORDS_FILE))?)
            .with_associations(WordAssociator::open(dir.join(ASSOC_FILE))?)
            .with_thoughts(ThoughtRecorder::open(dir.join(THOUGHT_FILE)))
            .build()
    }

    /// Attach a transport.
    pub fn set_client(&mut self, client: Box<dyn ChatClient>) {
        self.client = Some(client);
        self.update_status();
    }

    /// Re-read settings and apply them.
    ///
    /// On failure the current configuration stays in force.
    pub fn load_settings(&mut self) -> bool {
        let loaded = self.read_settings().and_then(|settings| {
            let config = EngineConfig::from_settings(&settings)?;
            Ok((settings, config))
        });
        match loaded {
            Ok((settings, config)) => {
                self.settings = settings;
                self.apply_config(config);
                true
            }
            Err(e) => {
                tracing::warn!("Settings reload failed, keeping current settings: {}", e);
                false
            }
        }
    }

    fn read_settings(&self) -> EngineResult<Settings> {
        match &self.settings_path {
            Some(path) => Settings::load(path, &self.fixed),
            None => Ok(self.settings.clone()),
        }
    }

    fn apply_config(&mut self, config: EngineConfig) {
        self.target_nick = config.target_nick.clone();
        self.recent_bases.resize(config.repeat_proof_count);
        self.learner
            .borrow_mut()
            .set_extract_from_log(!config.supervised);
        let mode = config.default_mode;
        self.config = config;
        self.change_mode(mode);
    }

    /// Switch talkativeness. Returns false if already in that mode.
    pub fn change_mode(&mut self, mode: TalkMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        self.attention.set_params(mode.params());
        self.update_status();
        true
    }

    fn update_status(&mut self) {
        let label = self.mode.status_label();
        if let Some(client) = self.client.as_mut() {
            client.set_status(label);
        }
    }

    /// Restart the random source from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Persist the vocabulary.
    pub fn save(&self) -> EngineResult<()> {
        self.vocabulary.borrow().save()?;
        Ok(())
    }

    /// Whether `text` addresses the agent by one of its nicknames.
    pub fn is_called(&self, text: &str) -> bool {
        self.config.is_called(text)
    }

    /// Someone else said something.
    ///
    /// `should_ignore` suppresses optional replies; mandatory ones still happen.
    pub fn on_other_speak(&mut self, nick: &str, input: &str, should_ignore: bool) -> EngineControl {
        let called = self.is_called(input);
        if called {
            match self.process_command(input) {
                CommandOutcome::Reply(reply) => {
                    if !reply.is_empty() {
                        if let Some(client) = self.client.as_mut() {
                            client.speak(&reply);
                        }
                    }
                    return EngineControl::Continue;
                }
                CommandOutcome::Exit => return EngineControl::Exit,
                CommandOutcome::NotCommand => {}
            }
        }

        self.last_speech = Some(input.to_string());
        self.study_msg(nick, input);
        self.pick_up_input_words(input);

        let probability = self.attention.on_other_speak(nick, input, called);
        tracing::debug!(probability, attention = %self.attention, "Response probability");
        let must_respond = probability > 1.0;
        if must_respond || (!should_ignore && self.rng.gen::<f64>() < probability) {
            self.speak_freely(nick, input, must_respond);
        }
        EngineControl::Continue
    }

    /// Nobody has spoken for a while.
    pub fn on_silent(&mut self) {
        let probability = self.attention.on_silent();
        if self.rng.gen::<f64>() >= probability {
            return;
        }
        let Some(stimulus) = self.last_speech.clone() else {
            return;
        };
        // Without this the agent could stay stuck on one stimulus forever.
        let must_respond = probability > self.rng.gen::<f64>() * 1.1;
        let from = self.learner.borrow().current_speaker().to_string();
        self.speak_freely(&from, &stimulus, must_respond);
    }

    /// Report to the operator, or to the trace log when detached.
    pub fn output_info(&mut self, text: &str) {
        match self.client.as_mut() {
            Some(client) => client.output_info(text),
            None => tracing::info!("{}", text),
        }
    }

    /// Current talkativeness.
    pub fn mode(&self) -> TalkMode {
        self.mode
    }

    /// The compiled configuration in force.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The attention model.
    pub fn attention(&self) -> &AttentionModel {
        &self.attention
    }

    /// The conversation log.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// The shared vocabulary.
    pub fn vocabulary(&self) -> Ref<'_, Vocabulary> {
        self.vocabulary.borrow()
    }

    /// Occurrence count at which words stop being adopted, fixed at startup.
    pub fn adoption_border(&self) -> usize {
        self.adoption_border
    }

    /// Topic words of the current and recent turns.
    pub fn input_words(&self) -> &InputWords {
        &self.inputs
    }
}
