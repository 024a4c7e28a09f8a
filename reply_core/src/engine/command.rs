//! Operator commands recognized in messages that address the agent.

use regex::Regex;

use super::ChatEngine;
use crate::attention::TalkMode;
use crate::settings::nick_regex;

/// A recognized command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reload settings from disk.
    Reload,
    ChangeMode(TalkMode),
    /// Save and disconnect.
    Shutdown,
    /// Only use messages from senders matching the pattern.
    Impersonate(String),
    StopImpersonating,
    /// Ask who taught a word.
    Provenance(String),
}

/// What handling a message as a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A reply to say. Empty when the command changed nothing.
    Reply(String),
    /// The agent should stop.
    Exit,
    /// Not a command; handle as conversation.
    NotCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Mode(TalkMode),
    Shutdown,
    Impersonate,
    StopImpersonating,
}

#[derive(Debug, Clone)]
struct CommandRule {
    pattern: Regex,
    action: Action,
}

/// Ordered command patterns; the first match wins.
#[derive(Debug, Clone)]
pub struct CommandTable {
    reload: Regex,
    rules: Vec<CommandRule>,
    provenance_query: Regex,
    quoted: Regex,
}

impl CommandTable {
    pub fn new() -> Result<Self, regex::Error> {
        let rule = |pattern: &str, action| -> Result<CommandRule, regex::Error> {
            Ok(CommandRule {
                pattern: Regex::new(pattern)?,
                action,
            })
        };

        Ok(Self {
            reload: Regex::new("設定を更新")?,
            rules: vec![
                rule("黙れ|黙りなさい|黙ってろ|沈黙モード", Action::Mode(TalkMode::Silent))?,
                rule("寡黙モード", Action::Mode(TalkMode::Reticent))?,
                rule("通常モード", Action::Mode(TalkMode::Normal))?,
                rule("饒舌モード", Action::Mode(TalkMode::Talkative))?,
                rule("必ず応答モード", Action::Mode(TalkMode::AlwaysRespond))?,
                rule("休んで良いよ|終了しなさい", Action::Shutdown)?,
                rule(
                    r"([\x21-\x7e]+)\s*の(?:もの|モノ|物)(?:まね|真似)",
                    Action::Impersonate,
                )?,
                rule(
                    "(?:もの|モノ|物)(?:まね|真似).*(?:解除|中止|終了|やめろ|やめて)",
                    Action::StopImpersonating,
                )?,
            ],
            provenance_query: Regex::new("覚えさせた|教わった")?,
            quoted: Regex::new("「(.+?)」")?,
        })
    }

    /// Recognize a command in `input`.
    ///
    /// Reload is checked first and provenance questions last.
    pub fn interpret(&self, input: &str) -> Option<Command> {
        if self.reload.is_match(input) {
            return Some(Command::Reload);
        }

        for rule in &self.rules {
            let Some(caps) = rule.pattern.captures(input) else {
                continue;
            };
            return Some(match rule.action {
                Action::Mode(mode) => Command::ChangeMode(mode),
                Action::Shutdown => Command::Shutdown,
                Action::Impersonate => {
                    Command::Impersonate(caps.get(1).map_or("", |m| m.as_str()).to_string())
                }
                Action::StopImpersonating => Command::StopImpersonating,
            });
        }

        if self.provenance_query.is_match(input) && input.contains('誰') {
            let caps = self.quoted.captures(input)?;
            return Some(Command::Provenance(caps[1].to_string()));
        }
        None
    }
}

impl ChatEngine {
    /// Handle `input` as an operator command if it is one.
    ///
    /// Settings reload works even when commands are disabled.
    pub fn process_command(&mut self, input: &str) -> CommandOutcome {
        let Some(command) = self.commands.interpret(input) else {
            return CommandOutcome::NotCommand;
        };
        if command != Command::Reload && !self.config.commands {
            return CommandOutcome::NotCommand;
        }
        tracing::debug!(?command, "Command");

        let reply = match command {
            Command::Reload => {
                if self.load_settings() {
                    "設定を更新しました。".to_string()
                } else {
                    "設定の更新に失敗した。".to_string()
                }
            }
            Command::ChangeMode(mode) => {
                if self.change_mode(mode) {
                    format!("{}に切り替える。", mode.label())
                } else {
                    String::new()
                }
            }
            Command::Shutdown => {
                if let Err(e) = self.save() {
                    tracing::warn!("Failed to save before exit: {}", e);
                }
                if let Some(client) = self.client.as_mut() {
                    client.exit();
                }
                return CommandOutcome::Exit;
            }
            Command::Impersonate(pattern) => match nick_regex(&pattern) {
                Ok(target) => {
                    self.target_nick = Some(target);
                    format!("{}のものまねを開始する。", pattern)
                }
                Err(e) => {
                    tracing::debug!("Rejected impersonation pattern {}: {}", pattern, e);
                    "正規表現が間違っている。".to_string()
                }
            },
            Command::StopImpersonating => {
                self.target_nick = self.config.target_nick.clone();
                "物まねを解除する。".to_string()
            }
            Command::Provenance(text) => match self.vocabulary.borrow().find(&text) {
                Some(word) if !word.author.is_empty() => format!("{}さんに。＞{}", word.author, text),
                Some(_) => format!("不確定だ。＞{}", text),
                None => "その単語は記憶していない。".to_string(),
            },
        };
        CommandOutcome::Reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CommandTable {
        CommandTable::new().unwrap()
    }

    #[test]
    fn test_mode_commands() {
        let table = table();
        assert_eq!(table.interpret("bot、黙れ"), Some(Command::ChangeMode(TalkMode::Silent)));
        assert_eq!(table.interpret("bot 寡黙モード"), Some(Command::ChangeMode(TalkMode::Reticent)));
        assert_eq!(table.interpret("bot 通常モードで"), Some(Command::ChangeMode(TalkMode::Normal)));
        assert_eq!(table.interpret("bot 饒舌モード"), Some(Command::ChangeMode(TalkMode::Talkative)));
        assert_eq!(
            table.interpret("bot 必ず応答モードにして"),
            Some(Command::ChangeMode(TalkMode::AlwaysRespond))
        );
    }

    #[test]
    fn test_reload_checked_first() {
        assert_eq!(table().interpret("bot 設定を更新して黙れ"), Some(Command::Reload));
    }

    #[test]
    fn test_shutdown() {
        assert_eq!(table().interpret("bot、休んで良いよ"), Some(Command::Shutdown));
    }

    #[test]
    fn test_impersonation() {
        let table = table();
        assert_eq!(
            table.interpret("bot、Alice のものまね"),
            Some(Command::Impersonate("Alice".into()))
        );
        assert_eq!(
            table.interpret("bot、[Alice の物真似"),
            Some(Command::Impersonate("[Alice".into()))
        );
        assert_eq!(
            table.interpret("bot、ものまねをやめて"),
            Some(Command::StopImpersonating)
        );
    }

    #[test]
    fn test_provenance() {
        let table = table();
        assert_eq!(
            table.interpret("bot、「ラーメン」って誰が覚えさせた？"),
            Some(Command::Provenance("ラーメン".into()))
        );
        assert_eq!(table.interpret("bot、「ラーメン」を覚えさせた"), None);
        assert_eq!(table.interpret("bot、誰が教わった？"), None);
    }

    #[test]
    fn test_plain_conversation() {
        assert_eq!(table().interpret("bot、今日はいい天気だね"), None);
    }
}
