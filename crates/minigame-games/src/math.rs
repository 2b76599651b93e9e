//! Math quiz: one arithmetic problem per round, answered from a set of
//! choices (or typed in when `choices` is 0) before the timer runs out.

use std::time::Duration;

use minigame_content::{
    ArithmeticParams, ContentError, Problem, RandomSource, answer_choices, arithmetic_problem,
    check_choices,
};
use minigame_engine::{GameAdapter, RoundOutcome, RoundTiming, ScorePolicy, SessionMode};
use serde::{Deserialize, Serialize};

pub struct MathQuiz;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MathExtras {
    pub max_operand: i64,
    pub max_factor: i64,
    /// Options shown per problem. 0 means free entry.
    pub choices: usize,
    /// How far distractors may be from the answer.
    pub spread: i64,
    pub points: i64,
    /// Time to answer. `None` waits forever.
    pub time_limit_ms: Option<u64>,
    pub cooldown_ms: u64,
}

impl Default for MathExtras {
    fn default() -> Self {
        Self {
            max_operand: 20,
            max_factor: 10,
            choices: 4,
            spread: 5,
            points: 10,
            time_limit_ms: Some(8_000),
            cooldown_ms: 800,
        }
    }
}

impl MathExtras {
    fn params(&self) -> ArithmeticParams {
        ArithmeticParams {
            max_operand: self.max_operand,
            max_factor: self.max_factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub problem: Problem,
    /// Empty in free-entry mode.
    pub choices: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer(pub i64);

impl GameAdapter for MathQuiz {
    type Extras = MathExtras;
    type Content = Question;
    type Input = Answer;
    const NAME: &'static str = "math_quiz";

    /// Every answer from 0 up must get its full set of choices.
    fn check_config(extras: &MathExtras, _mode: SessionMode) -> Result<(), String> {
        extras.params().check().map_err(|e| e.to_string())?;
        if extras.choices > 0 {
            check_choices(extras.choices, extras.spread).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn generate_content(
        extras: &MathExtras,
        _round: u32,
        rng: &mut dyn RandomSource,
    ) -> Result<Question, ContentError> {
        let problem = arithmetic_problem(rng, extras.params())?;
        let choices = match extras.choices {
            0 => Vec::new(),
            n => answer_choices(rng, problem.answer, n, extras.spread)?,
        };
        Ok(Question { problem, choices })
    }

    fn round_timing(extras: &MathExtras, _rng: &mut dyn RandomSource) -> RoundTiming {
        RoundTiming {
            presenting: None,
            input_limit: extras.time_limit_ms.map(Duration::from_millis),
            cooldown: Duration::from_millis(extras.cooldown_ms),
        }
    }

    fn scoring(_extras: &MathExtras) -> ScorePolicy {
        ScorePolicy::batch()
    }

    fn validate_input(
        _extras: &MathExtras,
        question: &Question,
        _collected: &[Answer],
        answer: &Answer,
    ) -> Result<(), String> {
        if !question.choices.is_empty() && !question.choices.contains(&answer.0) {
            return Err(format!("{} is not one of the choices", answer.0));
        }
        Ok(())
    }

    fn is_satisfied(_extras: &MathExtras, _question: &Question, collected: &[Answer]) -> bool {
        !collected.is_empty()
    }

    /// Only the first answer counts. No answer (time out) is wrong.
    fn resolve(extras: &MathExtras, question: &Question, collected: &[Answer]) -> RoundOutcome {
        match collected.first() {
            Some(a) if a.0 == question.problem.answer => RoundOutcome::correct(extras.points),
            _ => RoundOutcome::wrong(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minigame_content::Operator;

    fn question() -> Question {
        Question {
            problem: Problem {
                left: 7,
                right: 5,
                op: Operator::Add,
                answer: 12,
            },
            choices: vec![10, 12, 14, 9],
        }
    }

    #[test]
    fn test_right_answer_scores() {
        let e = MathExtras::default();
        assert_eq!(MathQuiz::resolve(&e, &question(), &[Answer(12)]), RoundOutcome::correct(10));
        assert_eq!(MathQuiz::resolve(&e, &question(), &[Answer(14)]), RoundOutcome::wrong(0));
        assert_eq!(MathQuiz::resolve(&e, &question(), &[]), RoundOutcome::wrong(0));
    }

    #[test]
    fn test_only_offered_choices_accepted() {
        let e = MathExtras::default();
        assert!(MathQuiz::validate_input(&e, &question(), &[], &Answer(11)).is_err());
        assert!(MathQuiz::validate_input(&e, &question(), &[], &Answer(9)).is_ok());

        let free = Question {
            choices: Vec::new(),
            ..question()
        };
        assert!(MathQuiz::validate_input(&e, &free, &[], &Answer(-3)).is_ok());
    }

    #[test]
    fn test_generated_choices_contain_answer() {
        let e = MathExtras::default();
        let mut rng = minigame_content::SequenceSource::new([0.1, 0.7, 0.35, 0.9, 0.5, 0.2]);
        for round in 0..10 {
            let q = MathQuiz::generate_content(&e, round, &mut rng).unwrap();
            assert_eq!(q.choices.len(), 4);
            assert!(q.choices.contains(&q.problem.answer));
            assert!(q.choices.iter().all(|&c| c >= 0));
        }
    }

    #[test]
    fn test_config_needs_room_for_choices_at_zero() {
        let mode = SessionMode::Rounds(std::num::NonZeroU32::MIN);
        let tight = MathExtras {
            spread: 2,
            ..MathExtras::default()
        };
        assert!(MathQuiz::check_config(&tight, mode).is_err());
        let fits = MathExtras {
            spread: 3,
            ..MathExtras::default()
        };
        assert!(MathQuiz::check_config(&fits, mode).is_ok());
        let free = MathExtras {
            choices: 0,
            spread: 0,
            ..MathExtras::default()
        };
        assert!(MathQuiz::check_config(&free, mode).is_ok());
        let huge = MathExtras {
            max_factor: i64::MAX,
            ..MathExtras::default()
        };
        assert!(MathQuiz::check_config(&huge, mode).is_err());
    }

    #[test]
    fn test_free_entry_has_no_choices() {
        let e = MathExtras {
            choices: 0,
            ..MathExtras::default()
        };
        let mut rng = minigame_content::SequenceSource::new([0.4]);
        let q = MathQuiz::generate_content(&e, 0, &mut rng).unwrap();
        assert!(q.choices.is_empty());
    }
}
