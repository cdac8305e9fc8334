//! Reduced ADM1 reference kinetics.
//!
//! Follows the IWA ADM1 / BSM2 process structure with three reductions that
//! keep the system non-stiff enough for fixed-step explicit integration:
//!
//! - pH and ion speciation are solved algebraically from the charge balance;
//!   the ion compartments relax towards that equilibrium at rate `k_ab`
//! - hydrogen is quasi-steady: uptake matches production up to the uptake
//!   capacity of X_h2 and any surplus is vented to the headspace
//! - the headspace vents at the rate gas is produced (no outlet valve term)

use ad_core::chemistry::{AcidBaseTotals, COD_PER_MOL_CH4, COD_PER_MOL_H2, Chemistry};
use ad_core::layout::{Compartment as C, LIQUID_DIM, STATE_DIM};
use ad_core::{ReactorParams, ReactorState};
use ad_feed::Influent;

use crate::error::{SimError, SimResult};
use crate::kinetics::Kinetics;

/// Stoichiometry and the rate constants not supplied by the feed.
///
/// Defaults are the BSM2 mesophilic parameter set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adm1Params {
    // disintegration products of X_xc
    pub f_si_xc: f64,
    pub f_xi_xc: f64,
    pub f_ch_xc: f64,
    pub f_pr_xc: f64,
    pub f_li_xc: f64,
    // nitrogen content, kmolN/kgCOD
    pub n_xc: f64,
    pub n_i: f64,
    pub n_aa: f64,
    pub n_bac: f64,
    // carbon content, kmolC/kgCOD
    pub c_xc: f64,
    pub c_si: f64,
    pub c_ch: f64,
    pub c_pr: f64,
    pub c_li: f64,
    pub c_xi: f64,
    pub c_su: f64,
    pub c_aa: f64,
    pub c_fa: f64,
    pub c_va: f64,
    pub c_bu: f64,
    pub c_pro: f64,
    pub c_ac: f64,
    pub c_bac: f64,
    pub c_ch4: f64,
    // product fractions
    pub f_fa_li: f64,
    pub f_h2_su: f64,
    pub f_bu_su: f64,
    pub f_pro_su: f64,
    pub f_ac_su: f64,
    pub f_h2_aa: f64,
    pub f_va_aa: f64,
    pub f_bu_aa: f64,
    pub f_pro_aa: f64,
    pub f_ac_aa: f64,
    // yields, kgCOD/kgCOD
    pub y_su: f64,
    pub y_aa: f64,
    pub y_fa: f64,
    pub y_c4: f64,
    pub y_pro: f64,
    pub y_ac: f64,
    pub y_h2: f64,
    // uptake of the guilds without a feed-dependent rate
    pub k_m_su: f64,
    pub k_m_aa: f64,
    pub k_m_fa: f64,
    // half-saturation, kgCOD/m³ (K_S_IN in kmolN/m³)
    pub k_s_su: f64,
    pub k_s_aa: f64,
    pub k_s_fa: f64,
    pub k_s_c4: f64,
    pub k_s_pro: f64,
    pub k_s_ac: f64,
    pub k_s_in: f64,
    pub k_dec: f64,
    // pH inhibition bands
    pub ph_ul_aa: f64,
    pub ph_ll_aa: f64,
    pub ph_ul_ac: f64,
    pub ph_ll_ac: f64,
    pub ph_ul_h2: f64,
    pub ph_ll_h2: f64,
    pub k_i_nh3: f64,
    /// Ion relaxation rate towards the charge-balance equilibrium, 1/d.
    pub k_ab: f64,
}

impl Default for Adm1Params {
    fn default() -> Self {
        Self {
            f_si_xc: 0.1,
            f_xi_xc: 0.2,
            f_ch_xc: 0.2,
            f_pr_xc: 0.2,
            f_li_xc: 0.3,
            n_xc: 0.0376 / 14.0,
            n_i: 0.06 / 14.0,
            n_aa: 0.007,
            n_bac: 0.08 / 14.0,
            c_xc: 0.02786,
            c_si: 0.03,
            c_ch: 0.0313,
            c_pr: 0.03,
            c_li: 0.022,
            c_xi: 0.03,
            c_su: 0.0313,
            c_aa: 0.03,
            c_fa: 0.0217,
            c_va: 0.024,
            c_bu: 0.025,
            c_pro: 0.0268,
            c_ac: 0.0313,
            c_bac: 0.0313,
            c_ch4: 0.0156,
            f_fa_li: 0.95,
            f_h2_su: 0.19,
            f_bu_su: 0.13,
            f_pro_su: 0.27,
            f_ac_su: 0.41,
            f_h2_aa: 0.06,
            f_va_aa: 0.23,
            f_bu_aa: 0.26,
            f_pro_aa: 0.05,
            f_ac_aa: 0.40,
            y_su: 0.1,
            y_aa: 0.08,
            y_fa: 0.06,
            y_c4: 0.06,
            y_pro: 0.04,
            y_ac: 0.05,
            y_h2: 0.06,
            k_m_su: 30.0,
            k_m_aa: 50.0,
            k_m_fa: 6.0,
            k_s_su: 0.5,
            k_s_aa: 0.3,
            k_s_fa: 0.4,
            k_s_c4: 0.2,
            k_s_pro: 0.1,
            k_s_ac: 0.15,
            k_s_in: 1e-4,
            k_dec: 0.02,
            ph_ul_aa: 5.5,
            ph_ll_aa: 4.0,
            ph_ul_ac: 7.0,
            ph_ll_ac: 6.0,
            ph_ul_h2: 6.0,
            ph_ll_h2: 5.0,
            k_i_nh3: 0.0018,
            k_ab: 1e3,
        }
    }
}

fn monod(s: f64, k_s: f64) -> f64 {
    let s = s.max(0.0);
    s / (k_s + s)
}

/// Hill-type pH inhibition: ~1 above `ul`, ~0 below `ll`.
fn ph_inhibition(s_h: f64, ul: f64, ll: f64) -> f64 {
    let n = 3.0 / (ul - ll);
    let k = 10f64.powf(-0.5 * (ul + ll)).powf(n);
    k / (s_h.powf(n) + k)
}

/// Reduced ADM1 for a single continuously stirred digester.
#[derive(Clone, Debug)]
pub struct Adm1Kinetics {
    reactor: ReactorParams,
    chem: Chemistry,
    params: Adm1Params,
}

impl Adm1Kinetics {
    pub fn new(reactor: ReactorParams) -> SimResult<Self> {
        Self::with_params(reactor, Adm1Params::default())
    }

    pub fn with_params(reactor: ReactorParams, params: Adm1Params) -> SimResult<Self> {
        reactor.validate()?;
        let f_sum = params.f_si_xc + params.f_xi_xc + params.f_ch_xc + params.f_pr_xc + params.f_li_xc;
        if (f_sum - 1.0).abs() > 1e-9 {
            return Err(SimError::InvalidArg {
                what: "disintegration fractions must sum to 1",
            });
        }
        Ok(Self {
            chem: reactor.chemistry(),
            reactor,
            params,
        })
    }

    pub fn reactor(&self) -> &ReactorParams {
        &self.reactor
    }

    pub fn chemistry(&self) -> &Chemistry {
        &self.chem
    }

    pub fn params(&self) -> &Adm1Params {
        &self.params
    }
}

impl Kinetics for Adm1Kinetics {
    fn derivatives(
        &self,
        _t: f64,
        state: &ReactorState,
        influent: &Influent,
    ) -> SimResult<ReactorState> {
        let p = &self.params;
        let k = &influent.kinetics;
        let x = state.as_slice();
        let at = |c: C| x[c.index()];
        let inflow = influent.concentrations();
        let dil = influent.flow() / self.reactor.v_liq_m3;

        // acid-base state
        let totals = AcidBaseTotals::from_slice(x);
        let sp = self.chem.equilibrium(&totals);
        let i_in = monod(at(C::SIn), p.k_s_in);
        let i_nh3 = 1.0 / (1.0 + sp.nh3.max(0.0) / p.k_i_nh3);
        let i_aa = ph_inhibition(sp.s_h, p.ph_ul_aa, p.ph_ll_aa) * i_in;
        let i_ac = ph_inhibition(sp.s_h, p.ph_ul_ac, p.ph_ll_ac) * i_in * i_nh3;
        let i_h2 = ph_inhibition(sp.s_h, p.ph_ul_h2, p.ph_ll_h2) * i_in;

        // process rates, kgCOD/(m³·d)
        let r_dis = k.kdis * at(C::XXc);
        let r_hyd_ch = k.khyd_ch * at(C::XCh);
        let r_hyd_pr = k.khyd_pr * at(C::XPr);
        let r_hyd_li = k.khyd_li * at(C::XLi);
        let r_su = p.k_m_su * monod(at(C::SSu), p.k_s_su) * at(C::XSu) * i_aa;
        let r_aa = p.k_m_aa * monod(at(C::SAa), p.k_s_aa) * at(C::XAa) * i_aa;
        let r_fa = p.k_m_fa * monod(at(C::SFa), p.k_s_fa) * at(C::XFa) * i_aa;
        let s_va = at(C::SVa).max(0.0);
        let s_bu = at(C::SBu).max(0.0);
        let r_va = k.km_c4 * monod(s_va, p.k_s_c4) * at(C::XC4) * s_va / (s_va + s_bu + 1e-6) * i_aa;
        let r_bu = k.km_c4 * monod(s_bu, p.k_s_c4) * at(C::XC4) * s_bu / (s_va + s_bu + 1e-6) * i_aa;
        let r_pro = k.km_pro * monod(at(C::SPro), p.k_s_pro) * at(C::XPro) * i_aa;
        let r_ac = k.km_ac * monod(at(C::SAc), p.k_s_ac) * at(C::XAc) * i_ac;

        let h2_production = (1.0 - p.y_su) * p.f_h2_su * r_su
            + (1.0 - p.y_aa) * p.f_h2_aa * r_aa
            + (1.0 - p.y_fa) * 0.3 * r_fa
            + (1.0 - p.y_c4) * 0.15 * r_va
            + (1.0 - p.y_c4) * 0.2 * r_bu
            + (1.0 - p.y_pro) * 0.43 * r_pro;
        let h2_capacity = (k.km_h2 * at(C::XH2) * i_h2).max(0.0);
        let r_h2 = h2_production.max(0.0).min(h2_capacity);
        let h2_vented = (h2_production - r_h2).max(0.0);

        let decay = |c: C| p.k_dec * at(c);
        let r_dec = [
            decay(C::XSu),
            decay(C::XAa),
            decay(C::XFa),
            decay(C::XC4),
            decay(C::XPro),
            decay(C::XAc),
            decay(C::XH2),
        ];
        let r_dec_sum: f64 = r_dec.iter().sum();

        // liquid-gas exchange
        let gas = self
            .reactor
            .gas_exchange(&self.chem, x, totals.s_ic - sp.hco3);
        let rho_h2_out = gas.rho_t_h2 + h2_vented;
        let q_gas = self
            .reactor
            .gas_flow(&self.chem, rho_h2_out, gas.rho_t_ch4, gas.rho_t_co2);

        let mut d = vec![0.0; STATE_DIM];
        for (i, di) in d.iter_mut().enumerate().take(LIQUID_DIM) {
            *di = dil * (inflow[i] - x[i]);
        }
        let mut add = |c: C, v: f64| d[c.index()] += v;

        add(C::SSu, r_hyd_ch + (1.0 - p.f_fa_li) * r_hyd_li - r_su);
        add(C::SAa, r_hyd_pr - r_aa);
        add(C::SFa, p.f_fa_li * r_hyd_li - r_fa);
        add(C::SVa, (1.0 - p.y_aa) * p.f_va_aa * r_aa - r_va);
        add(
            C::SBu,
            (1.0 - p.y_su) * p.f_bu_su * r_su + (1.0 - p.y_aa) * p.f_bu_aa * r_aa - r_bu,
        );
        add(
            C::SPro,
            (1.0 - p.y_su) * p.f_pro_su * r_su
                + (1.0 - p.y_aa) * p.f_pro_aa * r_aa
                + (1.0 - p.y_c4) * 0.54 * r_va
                - r_pro,
        );
        add(
            C::SAc,
            (1.0 - p.y_su) * p.f_ac_su * r_su
                + (1.0 - p.y_aa) * p.f_ac_aa * r_aa
                + (1.0 - p.y_fa) * 0.7 * r_fa
                + (1.0 - p.y_c4) * 0.31 * r_va
                + (1.0 - p.y_c4) * 0.8 * r_bu
                + (1.0 - p.y_pro) * 0.57 * r_pro
                - r_ac,
        );
        add(C::SH2, -gas.rho_t_h2);
        add(
            C::SCh4,
            (1.0 - p.y_ac) * r_ac + (1.0 - p.y_h2) * r_h2 - gas.rho_t_ch4,
        );

        // inorganic carbon closes the carbon balance of every process
        let carbon = [
            (
                p.c_xc
                    - p.f_si_xc * p.c_si
                    - p.f_ch_xc * p.c_ch
                    - p.f_pr_xc * p.c_pr
                    - p.f_li_xc * p.c_li
                    - p.f_xi_xc * p.c_xi,
                r_dis,
            ),
            (p.c_ch - p.c_su, r_hyd_ch),
            (p.c_pr - p.c_aa, r_hyd_pr),
            (
                p.c_li - (1.0 - p.f_fa_li) * p.c_su - p.f_fa_li * p.c_fa,
                r_hyd_li,
            ),
            (
                p.c_su
                    - (1.0 - p.y_su)
                        * (p.f_bu_su * p.c_bu + p.f_pro_su * p.c_pro + p.f_ac_su * p.c_ac)
                    - p.y_su * p.c_bac,
                r_su,
            ),
            (
                p.c_aa
                    - (1.0 - p.y_aa)
                        * (p.f_va_aa * p.c_va
                            + p.f_bu_aa * p.c_bu
                            + p.f_pro_aa * p.c_pro
                            + p.f_ac_aa * p.c_ac)
                    - p.y_aa * p.c_bac,
                r_aa,
            ),
            (
                p.c_fa - (1.0 - p.y_fa) * 0.7 * p.c_ac - p.y_fa * p.c_bac,
                r_fa,
            ),
            (
                p.c_va
                    - (1.0 - p.y_c4) * 0.54 * p.c_pro
                    - (1.0 - p.y_c4) * 0.31 * p.c_ac
                    - p.y_c4 * p.c_bac,
                r_va,
            ),
            (
                p.c_bu - (1.0 - p.y_c4) * 0.8 * p.c_ac - p.y_c4 * p.c_bac,
                r_bu,
            ),
            (
                p.c_pro - (1.0 - p.y_pro) * 0.57 * p.c_ac - p.y_pro * p.c_bac,
                r_pro,
            ),
            (
                p.c_ac - (1.0 - p.y_ac) * p.c_ch4 - p.y_ac * p.c_bac,
                r_ac,
            ),
            (-(1.0 - p.y_h2) * p.c_ch4 - p.y_h2 * p.c_bac, r_h2),
            (p.c_bac - p.c_xc, r_dec_sum),
        ];
        let carbon_release: f64 = carbon.iter().map(|(s, r)| s * r).sum();
        add(C::SIc, carbon_release - gas.rho_t_co2);

        add(
            C::SIn,
            -p.y_su * p.n_bac * r_su + (p.n_aa - p.y_aa * p.n_bac) * r_aa
                - p.y_fa * p.n_bac * r_fa
                - p.y_c4 * p.n_bac * (r_va + r_bu)
                - p.y_pro * p.n_bac * r_pro
                - p.y_ac * p.n_bac * r_ac
                - p.y_h2 * p.n_bac * r_h2
                + (p.n_bac - p.n_xc) * r_dec_sum
                + (p.n_xc - p.f_xi_xc * p.n_i - p.f_si_xc * p.n_i - p.f_pr_xc * p.n_aa) * r_dis,
        );
        add(C::SI, p.f_si_xc * r_dis);

        add(C::XXc, r_dec_sum - r_dis);
        add(C::XCh, p.f_ch_xc * r_dis - r_hyd_ch);
        add(C::XPr, p.f_pr_xc * r_dis - r_hyd_pr);
        add(C::XLi, p.f_li_xc * r_dis - r_hyd_li);
        add(C::XSu, p.y_su * r_su - r_dec[0]);
        add(C::XAa, p.y_aa * r_aa - r_dec[1]);
        add(C::XFa, p.y_fa * r_fa - r_dec[2]);
        add(C::XC4, p.y_c4 * (r_va + r_bu) - r_dec[3]);
        add(C::XPro, p.y_pro * r_pro - r_dec[4]);
        add(C::XAc, p.y_ac * r_ac - r_dec[5]);
        add(C::XH2, p.y_h2 * r_h2 - r_dec[6]);
        add(C::XI, p.f_xi_xc * r_dis);

        // ions follow the algebraic equilibrium
        for (c, eq) in [
            (C::SVaIon, sp.va_ion),
            (C::SBuIon, sp.bu_ion),
            (C::SProIon, sp.pro_ion),
            (C::SAcIon, sp.ac_ion),
            (C::SHco3Ion, sp.hco3),
            (C::SNh3, sp.nh3),
        ] {
            d[c.index()] = p.k_ab * (eq - at(c));
        }

        // headspace
        let v_ratio = self.reactor.v_liq_m3 / self.reactor.v_gas_m3;
        let washout = q_gas / self.reactor.v_gas_m3;
        let d_h2 = -washout * at(C::SGasH2) + rho_h2_out * v_ratio;
        let d_ch4 = -washout * at(C::SGasCh4) + gas.rho_t_ch4 * v_ratio;
        let d_co2 = -washout * at(C::SGasCo2) + gas.rho_t_co2 * v_ratio;
        let rt = self.chem.rt();
        d[C::SGasH2.index()] = d_h2;
        d[C::SGasCh4.index()] = d_ch4;
        d[C::SGasCo2.index()] = d_co2;
        d[C::PGas.index()] = rt * (d_h2 / COD_PER_MOL_H2 + d_ch4 / COD_PER_MOL_CH4 + d_co2);

        Ok(ReactorState::from_vec(d)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGESTER: [f64; STATE_DIM] = [
        0.012, 0.0053, 0.099, 0.0116, 0.0132, 0.0158, 0.197, 2.36e-7, 0.055, 0.14738, 0.13, 0.33,
        0.308, 0.028, 0.1027, 0.0295, 0.42, 1.18, 0.243, 0.432, 0.137, 0.76, 0.317, 25.6, 0.5,
        0.04, 0.0252, 0.0115, 0.0131, 0.0157, 0.1964, 0.1375, 0.0028, 1.02e-5, 1.63, 0.0141,
        1.0696,
    ];

    fn kinetics() -> Adm1Kinetics {
        Adm1Kinetics::new(ReactorParams::default()).unwrap()
    }

    fn digester() -> ReactorState {
        ReactorState::from_slice(&DIGESTER).unwrap()
    }

    #[test]
    fn derivatives_are_finite_at_operating_point() {
        let d = kinetics()
            .derivatives(0.0, &digester(), &Influent::idle())
            .unwrap();
        assert_eq!(d.len(), STATE_DIM);
        assert!(d.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn batch_mode_has_no_dilution_of_strong_ions() {
        let d = kinetics()
            .derivatives(0.0, &digester(), &Influent::idle())
            .unwrap();
        assert_eq!(d[C::SCation], 0.0);
        assert_eq!(d[C::SAnion], 0.0);
        assert_eq!(d[C::XP], 0.0);
    }

    #[test]
    fn acetate_uptake_produces_methane() {
        let k = kinetics();
        let lean = digester().with(C::SAc, 0.0);
        let d_rich = k.derivatives(0.0, &digester(), &Influent::idle()).unwrap();
        let d_lean = k.derivatives(0.0, &lean, &Influent::idle()).unwrap();
        assert!(d_rich[C::SCh4] > d_lean[C::SCh4]);
        assert!(d_rich[C::XAc] > d_lean[C::XAc]);
    }

    #[test]
    fn dilution_pulls_towards_influent() {
        let k = kinetics();
        let mut influent = Influent::idle();
        influent.values[C::SCation.index()] = 1.0;
        influent.values[ad_core::Q_INDEX] = 30.0;
        let d = k.derivatives(0.0, &digester(), &influent).unwrap();
        let expected = 30.0 / 3000.0 * (1.0 - 0.04);
        assert!((d[C::SCation] - expected).abs() < 1e-15);
    }

    #[test]
    fn ph_inhibition_band() {
        assert!(ph_inhibition(1e-8, 7.0, 6.0) > 0.99);
        assert!(ph_inhibition(1e-5, 7.0, 6.0) < 0.01);
        let mid = 10f64.powf(-6.5);
        assert!((ph_inhibition(mid, 7.0, 6.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_inconsistent_fractions() {
        let params = Adm1Params {
            f_li_xc: 0.5,
            ..Default::default()
        };
        assert!(Adm1Kinetics::with_params(ReactorParams::default(), params).is_err());
    }
}
