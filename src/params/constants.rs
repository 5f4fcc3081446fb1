//! Physical constants (SI, 2019 exact values)

/// Boltzmann constant \[J/K\]
pub const BOLTZMANN: f64 = 1.380_649e-23;

/// Elementary charge \[C\]
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Avogadro number \[1/mol\]
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Faraday constant \[C/mol\]
pub const FARADAY: f64 = ELEMENTARY_CHARGE * AVOGADRO;

/// Default reference temperature \[K\]
pub const T_REF_DEFAULT: f64 = 298.0;

/// Thermal energy `k T` \[J\]
pub fn thermal_energy(temperature: f64) -> f64 {
    BOLTZMANN * temperature
}

/// Thermal voltage `k T / e` \[V\]
pub fn thermal_voltage(temperature: f64) -> f64 {
    BOLTZMANN * temperature / ELEMENTARY_CHARGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_faraday() {
        assert_relative_eq!(FARADAY, 96_485.332, epsilon = 1e-3);
    }

    #[test]
    fn test_thermal_voltage_at_reference() {
        assert_relative_eq!(thermal_voltage(T_REF_DEFAULT), 0.025_679, epsilon = 1e-6);
    }
}
