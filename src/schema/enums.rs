//! Device property enumerations

native_enum! {
    /// `nvmlComputeMode_t`
    pub enum ComputeMode {
        Default = 0 => "default",
        /// Deprecated by the driver, still reported by old boards.
        ExclusiveThread = 1 => "exclusive-thread",
        Prohibited = 2 => "prohibited",
        ExclusiveProcess = 3 => "exclusive-process",
    }
}

native_enum! {
    /// `nvmlDeviceArchitecture_t`
    pub enum Architecture {
        Kepler = 2 => "Kepler",
        Maxwell = 3 => "Maxwell",
        Pascal = 4 => "Pascal",
        Volta = 5 => "Volta",
        Turing = 6 => "Turing",
        Ampere = 7 => "Ampere",
        Ada = 8 => "Ada",
        Hopper = 9 => "Hopper",
        Blackwell = 10 => "Blackwell",
    }
}

native_enum! {
    /// `nvmlBrandType`
    pub enum Brand {
        Unbranded = 0 => "unknown",
        Quadro = 1 => "Quadro",
        Tesla = 2 => "Tesla",
        Nvs = 3 => "NVS",
        Grid = 4 => "GRID",
        GeForce = 5 => "GeForce",
        Titan = 6 => "Titan",
        NvidiaVapps = 7 => "NVIDIA vApps",
        NvidiaVpc = 8 => "NVIDIA VPC",
        NvidiaVcs = 9 => "NVIDIA VCS",
        NvidiaVws = 10 => "NVIDIA VWS",
        NvidiaCloudGaming = 11 => "NVIDIA Cloud Gaming",
        QuadroRtx = 12 => "Quadro RTX",
        NvidiaRtx = 13 => "NVIDIA RTX",
        Nvidia = 14 => "NVIDIA",
        GeForceRtx = 15 => "GeForce RTX",
        TitanRtx = 16 => "Titan RTX",
    }
}

native_enum! {
    /// `nvmlDriverModel_t` (Windows only)
    pub enum DriverModel {
        Wddm = 0 => "WDDM",
        Wdm = 1 => "TCC",
        Mcdm = 2 => "MCDM",
    }
}

native_enum! {
    /// `nvmlGpuOperationMode_t`
    pub enum GpuOperationMode {
        AllOn = 0 => "all-on",
        Compute = 1 => "compute",
        LowDoublePrecision = 2 => "low-dp",
    }
}

native_enum! {
    /// `nvmlRestrictedAPI_t`
    pub enum RestrictedApi {
        SetApplicationClocks = 0 => "set-application-clocks",
        SetAutoBoostedClocks = 1 => "set-auto-boosted-clocks",
    }
}

native_enum! {
    /// `nvmlEnableState_t`
    pub enum EnableState {
        Disabled = 0 => "disabled",
        Enabled = 1 => "enabled",
    }
}

impl EnableState {
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

impl From<bool> for EnableState {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

native_enum! {
    /// `nvmlClockType_t`
    pub enum ClockType {
        Graphics = 0 => "graphics",
        Sm = 1 => "sm",
        Memory = 2 => "memory",
        Video = 3 => "video",
    }
}

native_enum! {
    /// `nvmlClockId_t`
    pub enum ClockId {
        Current = 0 => "current",
        AppClockTarget = 1 => "application-target",
        AppClockDefault = 2 => "application-default",
        CustomerBoostMax = 3 => "customer-boost-max",
    }
}

native_enum! {
    /// `nvmlTemperatureSensors_t`
    pub enum TemperatureSensor {
        Gpu = 0 => "gpu",
    }
}

native_enum! {
    /// `nvmlTemperatureThresholds_t`
    pub enum TemperatureThreshold {
        Shutdown = 0 => "shutdown",
        Slowdown = 1 => "slowdown",
        MemoryMax = 2 => "memory-max",
        GpuMax = 3 => "gpu-max",
        AcousticMin = 4 => "acoustic-min",
        AcousticCurrent = 5 => "acoustic-current",
        AcousticMax = 6 => "acoustic-max",
        GpsCurrent = 7 => "gps-current",
    }
}

native_enum! {
    /// `nvmlMemoryErrorType_t`
    pub enum MemoryErrorType {
        Corrected = 0 => "corrected",
        Uncorrected = 1 => "uncorrected",
    }
}

native_enum! {
    /// `nvmlEccCounterType_t`
    pub enum EccCounterType {
        Volatile = 0 => "volatile",
        Aggregate = 1 => "aggregate",
    }
}

native_enum! {
    /// `nvmlMemoryLocation_t`
    pub enum MemoryLocation {
        L1Cache = 0 => "L1 cache",
        L2Cache = 1 => "L2 cache",
        DeviceMemory = 2 => "device memory",
        RegisterFile = 3 => "register file",
        TextureMemory = 4 => "texture memory",
        TextureShm = 5 => "texture shared memory",
        Cbu = 6 => "CBU",
        Sram = 7 => "SRAM",
    }
}

native_enum! {
    /// `nvmlEncoderType_t`
    pub enum EncoderType {
        H264 = 0 => "H.264",
        Hevc = 1 => "HEVC",
        Av1 = 2 => "AV1",
    }
}

native_enum! {
    /// `nvmlFanControlPolicy_t`
    pub enum FanControlPolicy {
        TemperatureContinuousSw = 0 => "auto",
        Manual = 1 => "manual",
    }
}

native_enum! {
    /// `nvmlBridgeChipType_t`
    pub enum BridgeChipType {
        Plx = 0 => "PLX",
        Bro4 = 1 => "BRO4",
    }
}

native_enum! {
    /// `nvmlFBCSessionType_t`
    pub enum FbcSessionType {
        Unspecified = 0 => "unknown",
        ToSystem = 1 => "tosys",
        Cuda = 2 => "cuda",
        Video = 3 => "vid",
        HardwareEncoder = 4 => "hwenc",
    }
}

native_enum! {
    /// `nvmlPstates_t`. Code 32 means the state is unknown.
    pub enum PerformanceState {
        P0 = 0 => "P0",
        P1 = 1 => "P1",
        P2 = 2 => "P2",
        P3 = 3 => "P3",
        P4 = 4 => "P4",
        P5 = 5 => "P5",
        P6 = 6 => "P6",
        P7 = 7 => "P7",
        P8 = 8 => "P8",
        P9 = 9 => "P9",
        P10 = 10 => "P10",
        P11 = 11 => "P11",
        P12 = 12 => "P12",
        P13 = 13 => "P13",
        P14 = 14 => "P14",
        P15 = 15 => "P15",
    }
}
