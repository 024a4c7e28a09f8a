//! Free speech - the reply cascade and emission.

use regex::NoExpand;

use chat_corpus::{MessageId, SELF_NICK};

use super::generator::{self, trim_base_text};
use super::ChatEngine;
use crate::thought::{Strategy, ThoughtRecord};

impl ChatEngine {
    /// Replace every one of the agent's nicknames in `text`.
    pub fn replace_my_nicks(&self, text: &str, replacement: &str) -> String {
        match &self.config.nick_pattern {
            Some(pattern) => pattern.replace_all(text, NoExpand(replacement)).into_owned(),
            None => text.to_string(),
        }
    }

    /// Text of a base message, trimmed for use as a template.
    ///
    /// `None` when nothing is left after trimming.
    pub fn base_msg_str(&self, id: MessageId) -> Option<String> {
        self.log
            .get(id)
            .map(|message| trim_base_text(&message.body).to_string())
            .filter(|text| !text.is_empty())
    }

    fn generate(&mut self, base: &str, force: bool) -> Option<String> {
        let vocabulary = self.vocabulary.borrow();
        generator::generate(
            base,
            &vocabulary,
            self.adoption_border,
            &self.inputs.current,
            force,
            &mut self.rng,
        )
    }

    fn record_thought(
        &mut self,
        strategy: Strategy,
        similar_id: Option<MessageId>,
        response_id: MessageId,
        words: &[String],
        output: &str,
    ) {
        let record = ThoughtRecord {
            log_position: self.log.size().checked_sub(1),
            strategy,
            similar_id,
            response_id: Some(response_id),
            words: words.to_vec(),
            output: output.to_string(),
        };
        self.thoughts.record(&record);
    }

    /// Try to reply to `input` from `from`.
    ///
    /// With `must_respond` every strategy is tried and generation never
    /// rejects a base message for being too short. Returns what was said.
    pub fn speak_freely(&mut self, from: &str, input: &str, must_respond: bool) -> Option<String> {
        let scrubbed = self.replace_my_nicks(input, " ");
        let similar = self.base_msg_using_similarity(&scrubbed);
        let recent = self.inputs.recent.clone();
        let current = self.inputs.current.clone();

        let mut chosen: Option<(MessageId, String)> = None;
        if !recent.is_empty() {
            if let Some((similar_id, base_id)) = similar {
                let output = self
                    .base_msg_str(base_id)
                    .and_then(|base| self.generate(&base, must_respond));
                if let Some(output) = output {
                    self.record_thought(Strategy::SimilarSubstitution, Some(similar_id), base_id, &recent, &output);
                    chosen = Some((base_id, output));
                }
            }
            if chosen.is_none() {
                if let Some((source_id, base_id)) = self.base_msg_using_keyword(&recent) {
                    if let Some(output) = self.base_msg_str(base_id) {
                        self.record_thought(Strategy::KeywordVerbatim, Some(source_id), base_id, &recent, &output);
                        chosen = Some((base_id, output));
                    }
                }
            }
        } else if let Some((similar_id, base_id)) = similar {
            let output = self.base_msg_str(base_id).and_then(|base| {
                let has_words = !self.vocabulary.borrow().words_in(&base).is_empty();
                if !has_words {
                    Some(base)
                } else if must_respond {
                    self.generate(&base, true)
                } else {
                    None
                }
            });
            if let Some(output) = output {
                self.record_thought(Strategy::SimilarVerbatim, Some(similar_id), base_id, &current, &output);
                chosen = Some((base_id, output));
            }
        } else if must_respond && !current.is_empty() {
            if let Some((source_id, base_id)) = self.base_msg_using_keyword(&current) {
                if let Some(output) = self.base_msg_str(base_id) {
                    self.record_thought(Strategy::KeywordRecall, Some(source_id), base_id, &current, &output);
                    chosen = Some((base_id, output));
                }
            }
        }

        if chosen.is_none() && must_respond {
            chosen = self
                .random_base_msg()
                .and_then(|id| self.base_msg_str(id).map(|output| (id, output)));
        }

        let Some((base_id, output)) = chosen else {
            tracing::debug!("Nothing to say to: {}", input);
            return None;
        };
        self.recent_bases.push(base_id);
        let output = self.replace_my_nicks(&output, from);
        self.speak(input, &output);
        Some(output)
    }

    /// Say `output` as the reply to `input` and learn from it.
    pub(crate) fn speak(&mut self, input: &str, output: &str) {
        self.last_speech_input = Some(input.to_string());
        self.last_speech = Some(output.to_string());
        self.study_msg(SELF_NICK, output);
        if self.config.supervised {
            self.output_info(&format!("「{}」に反応した。", input));
        }

        let words: Vec<String> = self
            .vocabulary
            .borrow()
            .words_in(output)
            .into_iter()
            .map(|w| w.text.clone())
            .collect();
        self.attention.on_self_speak(words);

        if let Some(client) = self.client.as_mut() {
            client.speak(output);
        }
    }
}
