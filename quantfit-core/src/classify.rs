/// How well an estimated memory requirement fits the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    GpuReady,   // fits entirely in VRAM
    Ready,      // fits in RAM with at least half to spare
    WillBeSlow, // fits in RAM but uses more than half of it
    TooLarge,   // exceeds RAM
}

impl Performance {
    pub fn label(&self) -> &'static str {
        match self {
            Performance::GpuReady => "GPU-Ready",
            Performance::Ready => "Ready",
            Performance::WillBeSlow => "Will be slow",
            Performance::TooLarge => "Too large",
        }
    }

    pub fn is_viable(&self) -> bool {
        !matches!(self, Performance::TooLarge)
    }
}

/// A performance verdict plus the figures it was decided from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub performance: Performance,
    pub required_gb: f64,
    /// VRAM for [`Performance::GpuReady`], system RAM otherwise.
    pub available_gb: f64,
}

impl Classification {
    /// Which memory pool `available_gb` refers to.
    pub fn pool(&self) -> &'static str {
        match self.performance {
            Performance::GpuReady => "VRAM",
            _ => "RAM",
        }
    }

    /// e.g. `needs 5.20GB, 16.00GB RAM available`
    pub fn detail(&self) -> String {
        format!(
            "needs {:.2}GB, {:.2}GB {} available",
            self.required_gb,
            self.available_gb,
            self.pool()
        )
    }
}

/// Classify an estimated requirement against total RAM and VRAM.
/// Rules are checked in order; VRAM wins regardless of RAM.
pub fn classify(required_gb: f64, ram_gb: f64, vram_gb: f64) -> Classification {
    let (performance, available_gb) = if vram_gb >= required_gb {
        (Performance::GpuReady, vram_gb)
    } else if required_gb > ram_gb {
        (Performance::TooLarge, ram_gb)
    } else if required_gb > ram_gb * 0.5 {
        (Performance::WillBeSlow, ram_gb)
    } else {
        (Performance::Ready, ram_gb)
    };

    Classification {
        performance,
        required_gb,
        available_gb,
    }
}
