// Seeded constructors are engine API for reproducible streams; the CLI only
// reaches them through tests today
#![allow(dead_code)]

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest operand width we will draw; keeps every answer (including the
/// sum of two maximal operands) inside i64.
pub const MAX_SUPPORTED_DIGITS: u32 = 18;

/// Largest factor bound; the product of two maximal factors stays inside i64.
pub const MAX_SUPPORTED_FACTOR: i64 = 3_037_000_499;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Addition,
        Category::Subtraction,
        Category::Multiplication,
        Category::Division,
    ];

    /// Canonical lowercase name; also the history partition key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Addition => "addition",
            Category::Subtraction => "subtraction",
            Category::Multiplication => "multiplication",
            Category::Division => "division",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Addition => "Addition",
            Category::Subtraction => "Subtraction",
            Category::Multiplication => "Multiplication",
            Category::Division => "Division",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "addition" | "add" | "+" => Some(Category::Addition),
            "subtraction" | "sub" | "-" => Some(Category::Subtraction),
            "multiplication" | "mul" | "x" | "*" => Some(Category::Multiplication),
            "division" | "div" | "/" => Some(Category::Division),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single generated question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub question: String,
    pub answer: i64,
    pub category: Category,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.question)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("max digits must be between 1 and {MAX_SUPPORTED_DIGITS}, got {0}")]
    InvalidDigits(u32),
    #[error("max factor must be between 1 and {MAX_SUPPORTED_FACTOR}, got {0}")]
    InvalidFactor(i64),
}

/// Problem source for one category. Each generator owns its own random
/// stream, so independent instances never interfere and seeded streams
/// reproduce the same sequence.
pub trait Generator {
    fn generate(&mut self) -> Problem;
    fn category(&self) -> Category;
    fn name(&self) -> &'static str;
}

// Largest operand with at most `max_digits` decimal digits. A zero or
// oversized width would make the draw range empty or overflow, so it is
// rejected here rather than at draw time.
fn operand_upper_bound(max_digits: u32) -> Result<i64, GenerateError> {
    if max_digits == 0 || max_digits > MAX_SUPPORTED_DIGITS {
        return Err(GenerateError::InvalidDigits(max_digits));
    }
    Ok(10i64.pow(max_digits) - 1)
}

fn check_factor(max_factor: i64) -> Result<i64, GenerateError> {
    if !(1..=MAX_SUPPORTED_FACTOR).contains(&max_factor) {
        return Err(GenerateError::InvalidFactor(max_factor));
    }
    Ok(max_factor)
}

#[derive(Debug)]
pub struct AdditionGenerator {
    upper: i64,
    rng: StdRng,
}

impl AdditionGenerator {
    pub fn new(max_digits: u32) -> Result<Self, GenerateError> {
        Ok(Self {
            upper: operand_upper_bound(max_digits)?,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn seeded(max_digits: u32, seed: u64) -> Result<Self, GenerateError> {
        Ok(Self {
            upper: operand_upper_bound(max_digits)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Generator for AdditionGenerator {
    fn generate(&mut self) -> Problem {
        let num1 = self.rng.gen_range(1..=self.upper);
        let num2 = self.rng.gen_range(1..=self.upper);

        Problem {
            question: format!("{} + {}", num1, num2),
            answer: num1 + num2,
            category: Category::Addition,
        }
    }

    fn category(&self) -> Category {
        Category::Addition
    }

    fn name(&self) -> &'static str {
        "Addition"
    }
}

pub struct SubtractionGenerator {
    upper: i64,
    rng: StdRng,
}

impl SubtractionGenerator {
    pub fn new(max_digits: u32) -> Result<Self, GenerateError> {
        Ok(Self {
            upper: operand_upper_bound(max_digits)?,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn seeded(max_digits: u32, seed: u64) -> Result<Self, GenerateError> {
        Ok(Self {
            upper: operand_upper_bound(max_digits)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Generator for SubtractionGenerator {
    fn generate(&mut self) -> Problem {
        let num1 = self.rng.gen_range(1..=self.upper);
        // num2 may equal num1; the answer is never negative.
        let num2 = self.rng.gen_range(1..=num1);

        Problem {
            question: format!("{} - {}", num1, num2),
            answer: num1 - num2,
            category: Category::Subtraction,
        }
    }

    fn category(&self) -> Category {
        Category::Subtraction
    }

    fn name(&self) -> &'static str {
        "Subtraction"
    }
}

pub struct MultiplicationGenerator {
    max_factor: i64,
    rng: StdRng,
}

impl MultiplicationGenerator {
    pub fn new(max_factor: i64) -> Result<Self, GenerateError> {
        Ok(Self {
            max_factor: check_factor(max_factor)?,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn seeded(max_factor: i64, seed: u64) -> Result<Self, GenerateError> {
        Ok(Self {
            max_factor: check_factor(max_factor)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Generator for MultiplicationGenerator {
    fn generate(&mut self) -> Problem {
        let factor1 = self.rng.gen_range(1..=self.max_factor);
        let factor2 = self.rng.gen_range(1..=self.max_factor);

        Problem {
            question: format!("{} x {}", factor1, factor2),
            answer: factor1 * factor2,
            category: Category::Multiplication,
        }
    }

    fn category(&self) -> Category {
        Category::Multiplication
    }

    fn name(&self) -> &'static str {
        "Multiplication"
    }
}

#[derive(Debug)]
pub struct DivisionGenerator {
    max_factor: i64,
    rng: StdRng,
}

impl DivisionGenerator {
    pub fn new(max_factor: i64) -> Result<Self, GenerateError> {
        Ok(Self {
            max_factor: check_factor(max_factor)?,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn seeded(max_factor: i64, seed: u64) -> Result<Self, GenerateError> {
        Ok(Self {
            max_factor: check_factor(max_factor)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Generator for DivisionGenerator {
    // Built backwards from a product so the division is always exact.
    fn generate(&mut self) -> Problem {
        let factor1 = self.rng.gen_range(1..=self.max_factor);
        let factor2 = self.rng.gen_range(1..=self.max_factor);
        let dividend = factor1 * factor2;

        Problem {
            question: format!("{} / {}", dividend, factor1),
            answer: factor2,
            category: Category::Division,
        }
    }

    fn category(&self) -> Category {
        Category::Division
    }

    fn name(&self) -> &'static str {
        "Division"
    }
}

/// Builds the generator for a category with entropy-seeded randomness.
/// Addition/subtraction take the digit bound, multiplication/division the
/// factor bound.
pub fn generator_for(
    category: Category,
    max_digits: u32,
    max_factor: i64,
) -> Result<Box<dyn Generator>, GenerateError> {
    Ok(match category {
        Category::Addition => Box::new(AdditionGenerator::new(max_digits)?),
        Category::Subtraction => Box::new(SubtractionGenerator::new(max_digits)?),
        Category::Multiplication => Box::new(MultiplicationGenerator::new(max_factor)?),
        Category::Division => Box::new(DivisionGenerator::new(max_factor)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Recovers the two operands from a rendered question like "12 + 7".
    fn parse_operands(question: &str, op: &str) -> (i64, i64) {
        let sep = format!(" {} ", op);
        let mut parts = question.split(&sep);
        let left = parts
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| panic!("bad question: {}", question));
        let right = parts
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| panic!("bad question: {}", question));
        (left, right)
    }

    mod category_tests {
        use super::*;

        #[test]
        fn as_str_is_canonical_lowercase() {
            assert_eq!(Category::Addition.as_str(), "addition");
            assert_eq!(Category::Subtraction.as_str(), "subtraction");
            assert_eq!(Category::Multiplication.as_str(), "multiplication");
            assert_eq!(Category::Division.as_str(), "division");
        }

        #[test]
        fn label_is_human_readable() {
            assert_eq!(Category::Addition.label(), "Addition");
            assert_eq!(Category::Division.label(), "Division");
        }

        #[test]
        fn display_matches_label() {
            assert_eq!(Category::Multiplication.to_string(), "Multiplication");
        }

        #[test]
        fn from_str_canonical_names() {
            assert_eq!(Category::from_str("addition"), Some(Category::Addition));
            assert_eq!(
                Category::from_str("subtraction"),
                Some(Category::Subtraction)
            );
            assert_eq!(
                Category::from_str("multiplication"),
                Some(Category::Multiplication)
            );
            assert_eq!(Category::from_str("division"), Some(Category::Division));
        }

        #[test]
        fn from_str_aliases() {
            assert_eq!(Category::from_str("add"), Some(Category::Addition));
            assert_eq!(Category::from_str("sub"), Some(Category::Subtraction));
            assert_eq!(Category::from_str("mul"), Some(Category::Multiplication));
            assert_eq!(Category::from_str("div"), Some(Category::Division));
            assert_eq!(Category::from_str("+"), Some(Category::Addition));
            assert_eq!(Category::from_str("/"), Some(Category::Division));
        }

        #[test]
        fn from_str_case_insensitive() {
            assert_eq!(Category::from_str("ADDITION"), Some(Category::Addition));
            assert_eq!(Category::from_str("Division"), Some(Category::Division));
        }

        #[test]
        fn from_str_invalid_returns_none() {
            assert_eq!(Category::from_str("modulo"), None);
            assert_eq!(Category::from_str(""), None);
        }

        #[test]
        fn all_lists_each_category_once() {
            assert_eq!(Category::ALL.len(), 4);
            for category in Category::ALL {
                assert_eq!(
                    Category::ALL.iter().filter(|c| **c == category).count(),
                    1
                );
            }
        }

        #[test]
        fn serializes_as_lowercase_string() {
            let value = serde_json::to_value(Category::Subtraction).unwrap();
            assert_eq!(value, serde_json::json!("subtraction"));

            let back: Category = serde_json::from_value(value).unwrap();
            assert_eq!(back, Category::Subtraction);
        }
    }

    mod addition_tests {
        use super::*;

        #[test]
        fn operands_within_digit_bound() {
            let mut generator = AdditionGenerator::seeded(2, 11).unwrap();
            for _ in 0..200 {
                let problem = generator.generate();
                let (num1, num2) = parse_operands(&problem.question, "+");
                assert!((1..=99).contains(&num1), "num1 out of range: {}", num1);
                assert!((1..=99).contains(&num2), "num2 out of range: {}", num2);
                assert_eq!(problem.answer, num1 + num2);
                assert_eq!(problem.category, Category::Addition);
            }
        }

        #[test]
        fn single_digit_bound() {
            let mut generator = AdditionGenerator::seeded(1, 3).unwrap();
            for _ in 0..100 {
                let problem = generator.generate();
                let (num1, num2) = parse_operands(&problem.question, "+");
                assert!((1..=9).contains(&num1));
                assert!((1..=9).contains(&num2));
            }
        }

        #[test]
        fn sum_may_exceed_operand_width() {
            // 2-digit operands can sum past 99; make sure nothing clamps it.
            let mut generator = AdditionGenerator::seeded(2, 5).unwrap();
            let saw_wide_sum = (0..500).any(|_| generator.generate().answer > 99);
            assert!(saw_wide_sum);
        }

        #[test]
        fn reports_category_and_name() {
            let generator = AdditionGenerator::seeded(2, 0).unwrap();
            assert_eq!(generator.category(), Category::Addition);
            assert_eq!(generator.name(), "Addition");
        }
    }

    mod subtraction_tests {
        use super::*;

        #[test]
        fn answer_never_negative() {
            let mut generator = SubtractionGenerator::seeded(2, 17).unwrap();
            for _ in 0..200 {
                let problem = generator.generate();
                let (num1, num2) = parse_operands(&problem.question, "-");
                assert!((1..=99).contains(&num1));
                assert!(num2 >= 1 && num2 <= num1, "num2 {} > num1 {}", num2, num1);
                assert_eq!(problem.answer, num1 - num2);
                assert!(problem.answer >= 0);
            }
        }

        #[test]
        fn tie_produces_zero_answer() {
            // num2 is drawn inclusive of num1, so a zero answer must show up.
            let mut generator = SubtractionGenerator::seeded(1, 23).unwrap();
            let saw_zero = (0..500).any(|_| generator.generate().answer == 0);
            assert!(saw_zero);
        }

        #[test]
        fn reports_category_and_name() {
            let generator = SubtractionGenerator::seeded(2, 0).unwrap();
            assert_eq!(generator.category(), Category::Subtraction);
            assert_eq!(generator.name(), "Subtraction");
        }
    }

    mod multiplication_tests {
        use super::*;

        #[test]
        fn factors_within_bound() {
            let mut generator = MultiplicationGenerator::seeded(12, 31).unwrap();
            for _ in 0..200 {
                let problem = generator.generate();
                let (factor1, factor2) = parse_operands(&problem.question, "x");
                assert!((1..=12).contains(&factor1));
                assert!((1..=12).contains(&factor2));
                assert_eq!(problem.answer, factor1 * factor2);
                assert_eq!(problem.category, Category::Multiplication);
            }
        }

        #[test]
        fn reports_category_and_name() {
            let generator = MultiplicationGenerator::seeded(12, 0).unwrap();
            assert_eq!(generator.category(), Category::Multiplication);
            assert_eq!(generator.name(), "Multiplication");
        }
    }

    mod division_tests {
        use super::*;

        #[test]
        fn division_always_exact() {
            let mut generator = DivisionGenerator::seeded(12, 41).unwrap();
            for _ in 0..200 {
                let problem = generator.generate();
                let (dividend, divisor) = parse_operands(&problem.question, "/");
                assert!((1..=12).contains(&divisor));
                assert_eq!(dividend % divisor, 0, "inexact: {}", problem.question);
                assert_eq!(problem.answer * divisor, dividend);
                assert!((1..=12).contains(&problem.answer));
                assert_eq!(problem.category, Category::Division);
            }
        }

        #[test]
        fn reports_category_and_name() {
            let generator = DivisionGenerator::seeded(12, 0).unwrap();
            assert_eq!(generator.category(), Category::Division);
            assert_eq!(generator.name(), "Division");
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn zero_digits_rejected() {
            assert_eq!(
                AdditionGenerator::new(0).err(),
                Some(GenerateError::InvalidDigits(0))
            );
            assert_eq!(
                SubtractionGenerator::seeded(0, 1).err(),
                Some(GenerateError::InvalidDigits(0))
            );
        }

        #[test]
        fn oversized_digits_rejected() {
            assert_eq!(
                AdditionGenerator::new(MAX_SUPPORTED_DIGITS + 1).err(),
                Some(GenerateError::InvalidDigits(MAX_SUPPORTED_DIGITS + 1))
            );
        }

        #[test]
        fn max_supported_digits_accepted() {
            assert!(AdditionGenerator::seeded(MAX_SUPPORTED_DIGITS, 1).is_ok());
        }

        #[test]
        fn zero_factor_rejected() {
            assert_eq!(
                MultiplicationGenerator::new(0).err(),
                Some(GenerateError::InvalidFactor(0))
            );
            assert_eq!(
                DivisionGenerator::new(0).err(),
                Some(GenerateError::InvalidFactor(0))
            );
        }

        #[test]
        fn negative_factor_rejected() {
            assert_eq!(
                DivisionGenerator::new(-5).err(),
                Some(GenerateError::InvalidFactor(-5))
            );
        }

        #[test]
        fn oversized_factor_rejected() {
            let too_big = MAX_SUPPORTED_FACTOR + 1;
            assert_eq!(
                MultiplicationGenerator::new(too_big).err(),
                Some(GenerateError::InvalidFactor(too_big))
            );
        }

        #[test]
        fn error_messages_name_the_bound() {
            let err = AdditionGenerator::new(0).unwrap_err();
            assert!(err.to_string().contains("max digits"));

            let err = DivisionGenerator::new(0).unwrap_err();
            assert!(err.to_string().contains("max factor"));
        }
    }

    mod determinism_tests {
        use super::*;

        #[test]
        fn same_seed_reproduces_sequence() {
            let mut a = MultiplicationGenerator::seeded(12, 99).unwrap();
            let mut b = MultiplicationGenerator::seeded(12, 99).unwrap();
            for _ in 0..50 {
                assert_eq!(a.generate(), b.generate());
            }
        }

        #[test]
        fn generators_do_not_share_state() {
            // Draws from an unrelated generator must not disturb a seeded
            // stream.
            let mut reference = AdditionGenerator::seeded(2, 7).unwrap();
            let expected: Vec<Problem> = (0..20).map(|_| reference.generate()).collect();

            let mut interleaved = AdditionGenerator::seeded(2, 7).unwrap();
            let mut other = DivisionGenerator::seeded(12, 8).unwrap();
            let actual: Vec<Problem> = (0..20)
                .map(|_| {
                    other.generate();
                    interleaved.generate()
                })
                .collect();

            assert_eq!(expected, actual);
        }
    }

    mod factory_tests {
        use super::*;

        #[test]
        fn builds_matching_generator_per_category() {
            for category in Category::ALL {
                let generator = generator_for(category, 2, 12).unwrap();
                assert_eq!(generator.category(), category);
                assert_eq!(generator.name(), category.label());
            }
        }

        #[test]
        fn propagates_config_errors() {
            assert!(generator_for(Category::Addition, 0, 12).is_err());
            assert!(generator_for(Category::Division, 2, 0).is_err());
        }

        #[test]
        fn boxed_generator_produces_problems() {
            let mut generator = generator_for(Category::Subtraction, 2, 12).unwrap();
            let problem = generator.generate();
            assert_eq!(problem.category, Category::Subtraction);
            assert!(problem.answer >= 0);
        }
    }
}
