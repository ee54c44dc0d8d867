//! Income tax brackets, rebates, medical credits and retirement caps for one year

use serde::{Deserialize, Serialize};

use super::year::TaxYear;

/// A single progressive tax bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Lower bound (previous bracket's upper bound, 0 for the first)
    pub lower: f64,

    /// Upper bound, `None` for the open-ended top bracket
    pub upper: Option<f64>,

    /// Cumulative tax due at `lower`
    pub base: f64,

    /// Marginal rate applied above `lower` (0.26 = 26%)
    pub rate: f64,
}

impl Bracket {
    /// Whether taxable income falls in this bracket (upper bound inclusive)
    pub fn contains(&self, taxable_income: f64) -> bool {
        match self.upper {
            Some(upper) => taxable_income <= upper,
            None => true,
        }
    }

    /// Tax for an income inside this bracket
    pub fn tax_on(&self, taxable_income: f64) -> f64 {
        self.base + (taxable_income - self.lower) * self.rate
    }
}

/// Age-based rebates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rebates {
    /// Available to every taxpayer
    pub primary: f64,
    /// Added from age 65
    pub secondary: f64,
    /// Added from age 75, on top of the secondary rebate
    pub tertiary: f64,
}

/// Medical Schemes Fees Tax Credit, monthly amounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedicalCredits {
    /// Credit for each of the main member and first dependent
    pub first_two: f64,
    /// Credit for every further dependent
    pub additional: f64,
}

/// Cap on deductible retirement fund contributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementCap {
    /// Fraction of qualifying income (0.275 = 27.5%)
    pub percentage: f64,
    /// Absolute annual ceiling
    pub ceiling: f64,
}

/// Structural problems found in a rate table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("rate table has no brackets")]
    NoBrackets,
    #[error("bracket {index} upper bound {upper} is not above its lower bound {lower}")]
    BoundsNotIncreasing { index: usize, lower: f64, upper: f64 },
    #[error("only the last bracket may be open-ended (bracket {index})")]
    UnboundedBeforeEnd { index: usize },
    #[error("the last bracket must be open-ended")]
    LastBracketBounded,
}

/// Complete set of rates for one year of assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub year: TaxYear,
    pub brackets: Vec<Bracket>,
    pub rebates: Rebates,
    pub medical_credits: MedicalCredits,
    pub retirement_cap: RetirementCap,
}

impl RateTable {
    /// Build brackets from `(upper, base, rate)` triples in ascending order.
    /// Lower bounds are chained from the previous upper bound.
    pub fn brackets_from_bands(bands: &[(Option<f64>, f64, f64)]) -> Vec<Bracket> {
        let mut lower = 0.0;
        bands
            .iter()
            .map(|&(upper, base, rate)| {
                let bracket = Bracket { lower, upper, base, rate };
                if let Some(upper) = upper {
                    lower = upper;
                }
                bracket
            })
            .collect()
    }

    /// Bracket that applies to the given taxable income
    pub fn bracket_for(&self, taxable_income: f64) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.contains(taxable_income))
    }

    /// Tax before rebates on a taxable income
    pub fn bracket_tax(&self, taxable_income: f64) -> f64 {
        if taxable_income <= 0.0 {
            return 0.0;
        }
        self.bracket_for(taxable_income)
            .map(|b| b.tax_on(taxable_income))
            .unwrap_or(0.0)
    }

    /// Check the structural invariants the engine relies on
    pub fn validate(&self) -> Result<(), TableError> {
        let last = self.brackets.len().checked_sub(1).ok_or(TableError::NoBrackets)?;

        for (index, bracket) in self.brackets.iter().enumerate() {
            match bracket.upper {
                Some(upper) if upper <= bracket.lower => {
                    return Err(TableError::BoundsNotIncreasing {
                        index,
                        lower: bracket.lower,
                        upper,
                    });
                }
                None if index != last => return Err(TableError::UnboundedBeforeEnd { index }),
                _ => {}
            }
        }

        if self.brackets[last].upper.is_some() {
            return Err(TableError::LastBracketBounded);
        }

        Ok(())
    }

    /// Indices of brackets whose `base` disagrees with the previous bracket's
    /// formula at its upper bound by more than a rand
    pub fn inconsistent_bases(&self) -> Vec<usize> {
        self.brackets
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| {
                let boundary = pair[0].upper?;
                let expected = pair[0].tax_on(boundary);
                ((expected - pair[1].base).abs() > 1.0).then_some(i + 1)
            })
            .collect()
    }

    /// SARS rates for 2022/23
    pub fn sars_2023() -> Self {
        Self {
            year: TaxYear(2023),
            brackets: Self::brackets_from_bands(&[
                (Some(226_000.0), 0.0, 0.18),
                (Some(353_100.0), 40_680.0, 0.26),
                (Some(488_700.0), 73_726.0, 0.31),
                (Some(641_400.0), 115_762.0, 0.36),
                (Some(817_600.0), 170_734.0, 0.39),
                (Some(1_731_600.0), 239_452.0, 0.41),
                (None, 614_192.0, 0.45),
            ]),
            rebates: Rebates {
                primary: 16_425.0,
                secondary: 9_000.0,
                tertiary: 2_997.0,
            },
            medical_credits: MedicalCredits {
                first_two: 347.0,
                additional: 234.0,
            },
            retirement_cap: RetirementCap::sars_standard(),
        }
    }

    /// SARS rates for 2023/24
    pub fn sars_2024() -> Self {
        Self {
            year: TaxYear(2024),
            brackets: Self::brackets_from_bands(&Self::BANDS_FROM_2024),
            rebates: Rebates::from_2024(),
            medical_credits: MedicalCredits {
                first_two: 364.0,
                additional: 246.0,
            },
            retirement_cap: RetirementCap::sars_standard(),
        }
    }

    /// SARS rates for 2024/25
    pub fn sars_2025() -> Self {
        Self {
            year: TaxYear(2025),
            ..Self::sars_2024()
        }
    }

    /// SARS rates for 2025/26 (brackets and rebates unchanged from 2024/25)
    pub fn sars_2026() -> Self {
        Self {
            year: TaxYear(2026),
            ..Self::sars_2024()
        }
    }

    const BANDS_FROM_2024: [(Option<f64>, f64, f64); 7] = [
        (Some(237_100.0), 0.0, 0.18),
        (Some(370_500.0), 42_678.0, 0.26),
        (Some(512_800.0), 77_362.0, 0.31),
        (Some(673_000.0), 121_475.0, 0.36),
        (Some(857_900.0), 179_147.0, 0.39),
        (Some(1_817_000.0), 251_258.0, 0.41),
        (None, 644_489.0, 0.45),
    ];
}

impl Rebates {
    fn from_2024() -> Self {
        Self {
            primary: 17_235.0,
            secondary: 9_444.0,
            tertiary: 3_145.0,
        }
    }
}

impl RetirementCap {
    /// 27.5% of qualifying income, capped at R350,000
    pub fn sars_standard() -> Self {
        Self {
            percentage: 0.275,
            ceiling: 350_000.0,
        }
    }
}
