//! Ingestion - learning from what is said and picking up topic words.

use rand::seq::SliceRandom;
use rand::Rng;

use chat_corpus::{INPUT_NICK, TEACHER_NICK};

use super::generator::can_adopt;
use super::ChatEngine;

/// Chance (1 in N) of injecting a random topic when the input has no known words.
const RANDOM_TOPIC_ODDS: u32 = 50;

/// Chance (1 in N) of adding new topic words to the working set instead of replacing it.
const TOPIC_CARRY_ODDS: u32 = 5;

/// Topic words recognized in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputWords {
    /// Words recognized in the latest utterance.
    pub recent: Vec<String>,

    /// Working set carried across turns.
    pub current: Vec<String>,
}

impl InputWords {
    /// Take in this turn's words.
    ///
    /// Usually the working set is replaced; sometimes the new words are added to it.
    pub fn absorb<R: Rng + ?Sized>(&mut self, words: Vec<String>, rng: &mut R) {
        self.recent = words;
        if self.recent.is_empty() {
            return;
        }
        if rng.gen_range(0..TOPIC_CARRY_ODDS) != 0 {
            self.current = self.recent.clone();
        } else {
            self.current.extend(self.recent.iter().cloned());
        }
    }
}

impl ChatEngine {
    /// Learn from an utterance.
    ///
    /// Supervised engines only extract words from it; otherwise it is logged.
    pub(crate) fn study_msg(&mut self, nick: &str, input: &str) {
        if !self.config.studying {
            return;
        }
        if self.config.supervised {
            {
                let mut learner = self.learner.borrow_mut();
                if !nick.starts_with('!') {
                    learner.set_current_speaker(nick);
                }
                learner.learn_line(input);
            }
        } else {
            self.log.append(nick, input);
        }
        self.absorb_new_words();
    }

    /// Announce words the learner discovered and find their earlier occurrences.
    pub(crate) fn absorb_new_words(&mut self) {
        let discovered = self.learner.borrow_mut().take_discovered();
        if discovered.is_empty() {
            return;
        }

        for word in &discovered {
            self.vocabulary.borrow_mut().backfill(word, self.log.iter());
            self.output_info(&format!("単語「{}」を記憶した。", word));
        }

        if self.config.auto_save {
            if let Err(e) = self.vocabulary.borrow().save() {
                tracing::warn!("Failed to save vocabulary: {}", e);
            }
        }
    }

    /// Recognize this turn's topic words in `input`.
    pub fn pick_up_input_words(&mut self, input: &str) {
        let input = self.replace_my_nicks(input, " ");
        let mut words: Vec<String> = {
            let vocabulary = self.vocabulary.borrow();
            let mut words: Vec<String> = vocabulary
                .words_in(&input)
                .into_iter()
                .filter(|w| can_adopt(w, self.adoption_border))
                .map(|w| w.text.clone())
                .collect();

            if words.is_empty() && self.rng.gen_range(0..RANDOM_TOPIC_ODDS) == 0 {
                if let Some(word) = vocabulary.words().choose(&mut self.rng) {
                    if can_adopt(word, self.adoption_border) {
                        tracing::debug!("Random topic: {}", word.text);
                        words.push(word.text.clone());
                    }
                }
            }
            words
        };

        let associated: Vec<String> = words
            .iter()
            .filter_map(|w| self.associations.associate(w))
            .map(str::to_string)
            .collect();
        words.extend(associated);

        self.inputs.absorb(words, &mut self.rng);
    }

    /// An operator taught a reaction through the control channel.
    ///
    /// `input→→output` teaches both sides; a bare text is taught as the
    /// reaction to whatever the agent last replied to.
    pub fn on_control_msg(&mut self, text: &str) {
        if !self.config.studying || !self.config.supervised {
            return;
        }
        let (input, output) = match text.rsplit_once("→→") {
            Some((input, output)) if !input.is_empty() && !output.is_empty() => {
                (input.to_string(), output.to_string())
            }
            _ => match self.last_speech_input.clone() {
                Some(input) => (input, text.to_string()),
                None => return,
            },
        };

        self.log.append(INPUT_NICK, input.as_str());
        self.log.append(TEACHER_NICK, output.as_str());
        self.absorb_new_words();
        self.output_info(&format!("反応「{}→→{}」を学習した。", input, output));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_absorb_ignores_empty_turns() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut inputs = InputWords::default();
        inputs.absorb(vec!["ラーメン".into()], &mut rng);
        inputs.absorb(Vec::new(), &mut rng);

        assert!(inputs.recent.is_empty());
        assert_eq!(inputs.current, vec!["ラーメン"]);
    }

    #[test]
    fn test_absorb_mostly_replaces() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut replaced = 0;
        for _ in 0..500 {
            let mut inputs = InputWords {
                recent: Vec::new(),
                current: vec!["うどん".into()],
            };
            inputs.absorb(vec!["カレー".into()], &mut rng);
            if inputs.current == vec!["カレー".to_string()] {
                replaced += 1;
            } else {
                assert_eq!(inputs.current, vec!["うどん", "カレー"]);
            }
        }
        assert!(replaced > 300 && replaced < 480);
    }
}
