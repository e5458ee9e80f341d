#[cfg(test)]
mod tests {
    use cerebellum_models::{
        capability::{
            check_capability, ALL_CAPABILITIES, CAN_DISCONNECT_DENDRITES, CAN_KO_AIS_CHANNELS,
            CAN_KO_CAV2PT1_CHANNELS, PRODUCES_ELECTRICAL_RESPONSE, PRODUCES_SPIKE_TRAIN,
        },
        error::CapabilityError,
    };

    #[test]
    pub fn test_declared_methods_pass() -> Result<(), CapabilityError> {
        check_capability("produce_voltage_response", &PRODUCES_ELECTRICAL_RESPONSE)?;
        check_capability("produce_spike_train", &PRODUCES_SPIKE_TRAIN)?;
        check_capability("ko_AIS_channels", &CAN_KO_AIS_CHANNELS)?;
        check_capability("ko_Cav2_1_channels", &CAN_KO_CAV2PT1_CHANNELS)?;
        check_capability("disconnect_dendrites_from_soma", &CAN_DISCONNECT_DENDRITES)?;

        Ok(())
    }

    #[test]
    pub fn test_undeclared_method_fails() {
        match check_capability("produce_spike_train", &PRODUCES_ELECTRICAL_RESPONSE) {
            Err(CapabilityError::CapabilityMissing { interface, method }) => {
                assert_eq!(interface, "ProducesElectricalResponse");
                assert_eq!(method, "produce_spike_train");
            },
            Ok(()) => panic!("method should not be declared"),
        }

        // names are matched exactly
        assert!(check_capability("ko_ais_channels", &CAN_KO_AIS_CHANNELS).is_err());
    }

    #[test]
    pub fn test_every_interface_declares_one_method() {
        for interface in ALL_CAPABILITIES {
            assert_eq!(interface.methods.len(), 1, "{}", interface.name);
            assert!(check_capability(interface.methods[0], &interface).is_ok());
        }
    }
}
