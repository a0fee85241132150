//! User tags on nets and instances.
//!
//! Net tags start unset. With `strict_tags` enabled (the default), reading an
//! unset net tag is an error rather than a silent default. Instance tags are
//! tri-state and simply report `None` when unset.

use crate::design::Design;
use crate::error::{NetlistError, NetlistResult};
use crate::ids::{InstanceId, NetId};
use crate::types::{NetTags, NetType, NetUse};

impl Design {
    fn net_tag<T: Default>(
        &self,
        net: NetId,
        tag: &'static str,
        read: impl FnOnce(&NetTags) -> Option<T>,
    ) -> NetlistResult<T> {
        match read(&self.nets[net].tags) {
            Some(value) => Ok(value),
            None if !self.settings.strict_tags => Ok(T::default()),
            None => Err(NetlistError::UnsetNetTag {
                net: self.net_name(net).to_string(),
                tag,
            }),
        }
    }

    fn update_net_tags(&mut self, net: NetId, write: impl FnOnce(&mut NetTags)) {
        let stamp = self.bump();
        let record = &mut self.nets[net];
        write(&mut record.tags);
        record.stamp = stamp;
    }

    /// Marks a net as ideal or not.
    pub fn set_net_ideal(&mut self, net: NetId, ideal: bool) {
        self.update_net_tags(net, |t| t.ideal = Some(ideal));
    }

    /// Returns whether a net is ideal.
    pub fn net_is_ideal(&self, net: NetId) -> NetlistResult<bool> {
        self.net_tag(net, "ideal", |t| t.ideal)
    }

    /// Marks a net as part of a clock network or not.
    pub fn set_clock_network(&mut self, net: NetId, clock: bool) {
        self.update_net_tags(net, |t| t.clock_network = Some(clock));
    }

    /// Returns whether a net belongs to a clock network.
    pub fn is_clock_network(&self, net: NetId) -> NetlistResult<bool> {
        self.net_tag(net, "clock_network", |t| t.clock_network)
    }

    /// Sets a net's classification.
    pub fn set_net_type(&mut self, net: NetId, net_type: NetType) {
        self.update_net_tags(net, |t| t.net_type = Some(net_type));
    }

    /// Returns a net's classification.
    pub fn net_type(&self, net: NetId) -> NetlistResult<NetType> {
        self.net_tag(net, "net_type", |t| t.net_type)
    }

    /// Sets what a net carries.
    pub fn set_net_use(&mut self, net: NetId, net_use: NetUse) {
        self.update_net_tags(net, |t| t.net_use = Some(net_use));
    }

    /// Returns what a net carries.
    pub fn net_use(&self, net: NetId) -> NetlistResult<NetUse> {
        self.net_tag(net, "net_use", |t| t.net_use)
    }

    /// Marks an instance as fixed in place or movable.
    pub fn set_fixed(&mut self, instance: impl Into<InstanceId>, fixed: bool) {
        let id = instance.into();
        let stamp = self.bump();
        let record = &mut self.instances[id];
        record.tags.fixed = Some(fixed);
        record.stamp = stamp;
    }

    /// Returns the fixed tag, or `None` if it was never set.
    pub fn is_fixed(&self, instance: impl Into<InstanceId>) -> Option<bool> {
        self.instances[instance.into()].tags.fixed
    }

    /// Marks placement over an instance as blocked or allowed.
    pub fn set_placement_blocked(&mut self, instance: impl Into<InstanceId>, blocked: bool) {
        let id = instance.into();
        let stamp = self.bump();
        let record = &mut self.instances[id];
        record.tags.placement_blocked = Some(blocked);
        record.stamp = stamp;
    }

    /// Returns the placement-blocked tag, or `None` if it was never set.
    pub fn is_placement_blocked(&self, instance: impl Into<InstanceId>) -> Option<bool> {
        self.instances[instance.into()].tags.placement_blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::StrataConfig;

    #[test]
    fn unset_net_tags_are_errors() {
        let mut d = Design::new("top");
        let n = d.create_net("clk", d.top_module()).unwrap();
        assert_eq!(
            d.net_is_ideal(n).unwrap_err(),
            NetlistError::UnsetNetTag {
                net: "clk".into(),
                tag: "ideal"
            }
        );
        assert!(d.is_clock_network(n).is_err());
        assert!(d.net_type(n).is_err());
        assert!(d.net_use(n).is_err());
    }

    #[test]
    fn set_net_tags_read_back() {
        let mut d = Design::new("top");
        let n = d.create_net("clk", d.top_module()).unwrap();
        d.set_net_ideal(n, true);
        d.set_clock_network(n, true);
        d.set_net_type(n, NetType::Special);
        d.set_net_use(n, NetUse::Clock);
        assert_eq!(d.net_is_ideal(n), Ok(true));
        assert_eq!(d.is_clock_network(n), Ok(true));
        assert_eq!(d.net_type(n), Ok(NetType::Special));
        assert_eq!(d.net_use(n), Ok(NetUse::Clock));
    }

    #[test]
    fn lenient_tags_default() {
        let mut config = StrataConfig::new("top");
        config.netlist.strict_tags = false;
        let mut d = Design::from_config(&config);
        let n = d.create_net("n", d.top_module()).unwrap();
        assert_eq!(d.net_is_ideal(n), Ok(false));
        assert_eq!(d.net_type(n), Ok(NetType::Regular));
        assert_eq!(d.net_use(n), Ok(NetUse::Signal));
    }

    #[test]
    fn setting_a_tag_stamps_the_net() {
        let mut d = Design::new("top");
        let n = d.create_net("n", d.top_module()).unwrap();
        let before = d.net(n).stamp;
        d.set_net_ideal(n, false);
        assert!(d.net(n).stamp > before);
        assert_eq!(d.net(n).stamp, d.revision());
    }

    #[test]
    fn instance_tags_are_tri_state() {
        let mut d = Design::new("top");
        let top = d.top_module();
        let p = d
            .create_port("a", strata_library::PinDirection::Input, top)
            .unwrap();
        assert_eq!(d.is_fixed(p), None);
        d.set_fixed(p, false);
        assert_eq!(d.is_fixed(p), Some(false));
        d.set_placement_blocked(p, true);
        assert_eq!(d.is_placement_blocked(p), Some(true));
    }
}
