use crate::error::Result;
use crate::shortcode::ShortCode;
use compactlink_idgen::{Clock, CompactIdGenerator};

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage;
/// the service re-checks every code against its repository.
///
/// `generate` may block (a compact id generator waits out an exhausted
/// second), so async callers run it on a blocking thread.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> Result<ShortCode>;
}

impl<C: Clock + 'static> Generator for CompactIdGenerator<C> {
    fn generate(&self) -> Result<ShortCode> {
        let code = self.mint_short_code()?;
        Ok(ShortCode::generated(code))
    }
}

#[cfg(test)]
mod tests {
    use super::Generator;
    use crate::error::ShortenerError;
    use crate::shortcode::ShortCode;
    use compactlink_idgen::{CompactId, CompactIdGenerator, CompactIdSettings};

    #[test]
    fn compact_id_generator_implements_generator_trait() {
        let settings = CompactIdSettings::builder().machine_id(1).build();
        let generator = CompactIdGenerator::new(settings).unwrap();

        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();

        assert!(matches!(first, ShortCode::Generated(_)));
        assert!(matches!(second, ShortCode::Generated(_)));
        assert_ne!(first.as_str(), second.as_str());
        assert_eq!(first.as_str().len(), 7);
    }

    #[test]
    fn generated_codes_carry_the_machine_id() {
        let settings = CompactIdSettings::builder().machine_id(42).build();
        let generator = CompactIdGenerator::new(settings).unwrap();

        let ShortCode::Generated(code) = generator.generate().unwrap() else {
            panic!("expected a generated code");
        };
        let id = CompactId::try_from(&code).unwrap();
        assert_eq!(id.machine_id(), 42);
    }

    #[test]
    fn generator_errors_convert_into_shortener_errors() {
        let err: ShortenerError = compactlink_idgen::Error::StatePoisoned.into();
        assert!(matches!(
            err,
            ShortenerError::Generator(compactlink_idgen::Error::StatePoisoned)
        ));
    }
}
